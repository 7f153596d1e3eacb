//! Spacing validators.
//!
//! Scenario tables ask for breathing room along one axis: the sum of
//! margin and padding on that axis must reach a minimum. Values come from
//! resolved styles, so the check reflects the current viewport.

use std::sync::Arc;

use async_trait::async_trait;

use crate::check::CheckResult;
use crate::registry::{Validator, ValidatorRegistry};
use crate::session::{BrowserSession, ElementRef, SessionResult};
use crate::style::{StyleReader, parse_px};

/// Default minimum combined margin+padding along an axis, px.
const DEFAULT_MIN_GAP_PX: f64 = 8.0;

/// The spacing registry with the default axis rules.
pub fn registry() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new("spacing");
    registry.register(
        "horizontal",
        Arc::new(SpacingAxis {
            properties: &["margin-left", "margin-right", "padding-left", "padding-right"],
            axis: "horizontal",
            min_px: DEFAULT_MIN_GAP_PX,
        }),
    );
    registry.register(
        "vertical",
        Arc::new(SpacingAxis {
            properties: &["margin-top", "margin-bottom", "padding-top", "padding-bottom"],
            axis: "vertical",
            min_px: DEFAULT_MIN_GAP_PX,
        }),
    );
    registry
}

/// Minimum combined spacing along one axis.
pub struct SpacingAxis {
    pub properties: &'static [&'static str],
    pub axis: &'static str,
    pub min_px: f64,
}

#[async_trait]
impl Validator for SpacingAxis {
    fn describe(&self) -> String {
        format!(
            "{} margin+padding totals at least {:.0}px",
            self.axis, self.min_px
        )
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let snapshot = StyleReader::new(session).snapshot(el, self.properties).await;
        let total: f64 = self
            .properties
            .iter()
            .filter_map(|p| snapshot.get(*p).and_then(|v| v.as_deref()).and_then(parse_px))
            .sum();
        let passed = total >= self.min_px;
        let message = format!(
            "element {}: {} (measured {total:.1}px)",
            el.id(),
            self.describe(),
        );
        Ok(if passed {
            CheckResult::pass(message).with_measured(total)
        } else {
            CheckResult::fail(message).with_measured(total)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_both_axes() {
        let registry = registry();
        assert!(registry.get("horizontal").is_some());
        assert!(registry.get("Vertical").is_some());
        assert!(registry.get("diagonal").is_none());
    }
}
