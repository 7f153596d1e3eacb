//! Layout region validators.
//!
//! Footer and header scenarios place components by named region: "left",
//! "center", "right", "full-width". Placement is judged from the bounding
//! box against viewport thirds at the time of the check.

use std::sync::Arc;

use async_trait::async_trait;

use crate::check::CheckResult;
use crate::registry::{Validator, ValidatorRegistry};
use crate::session::{BrowserSession, ElementRef, SessionResult};
use crate::style::{StyleReader, viewport_size};

/// Minimum fraction of the viewport width a "full-width" element must span.
const FULL_WIDTH_FRACTION: f64 = 0.9;

/// The layout registry with the default region rules.
pub fn registry() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new("layout");
    registry.register("left", Arc::new(Region::Left));
    registry.register("center", Arc::new(Region::Center));
    registry.register("right", Arc::new(Region::Right));
    registry.register("full-width", Arc::new(Region::FullWidth));
    registry
}

/// A named horizontal region of the viewport.
enum Region {
    Left,
    Center,
    Right,
    FullWidth,
}

impl Region {
    fn name(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::FullWidth => "full-width",
        }
    }
}

#[async_trait]
impl Validator for Region {
    fn describe(&self) -> String {
        format!("element sits in the {} region of the viewport", self.name())
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let bounds = StyleReader::new(session).bounding_box(el).await;
        let viewport = viewport_size(session).await;

        let (passed, detail) = match (bounds, viewport) {
            (Some(b), Some(v)) => {
                let third = v.width / 3.0;
                let center = b.center_x();
                let passed = match self {
                    Self::Left => center < third,
                    Self::Center => center >= third && center <= 2.0 * third,
                    Self::Right => center > 2.0 * third,
                    Self::FullWidth => b.width >= FULL_WIDTH_FRACTION * v.width,
                };
                (
                    passed,
                    format!(
                        "center x {center:.0}, width {:.0}, viewport width {:.0}",
                        b.width, v.width
                    ),
                )
            }
            _ => (false, "box or viewport unreadable".to_string()),
        };

        let message = format!("element {}: {} ({detail})", el.id(), self.describe());
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}
