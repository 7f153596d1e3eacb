//! Widget style-aspect validators.
//!
//! Button scenarios check styling by named aspect: a visible background, a
//! rounded border, real padding, a readable font size.

use std::sync::Arc;

use async_trait::async_trait;

use crate::check::CheckResult;
use crate::registry::{StyleOpaque, StyleSet, Validator, ValidatorRegistry};
use crate::session::{BrowserSession, ElementRef, SessionResult};
use crate::style::{StyleReader, parse_px};

/// Smallest font size considered readable for widget text, px.
const MIN_READABLE_FONT_PX: f64 = 12.0;

/// The style-aspect registry with the default rules: background,
/// border-radius, padding, font.
pub fn registry() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new("style");
    registry.register(
        "background",
        Arc::new(StyleOpaque {
            property: "background-color",
        }),
    );
    registry.register(
        "border-radius",
        Arc::new(StyleSet {
            property: "border-top-left-radius",
        }),
    );
    registry.register("padding", Arc::new(PaddingSet));
    registry.register(
        "font",
        Arc::new(MinFontSize {
            min_px: MIN_READABLE_FONT_PX,
        }),
    );
    registry
}

/// Non-zero padding on at least one side.
struct PaddingSet;

#[async_trait]
impl Validator for PaddingSet {
    fn describe(&self) -> String {
        "element has non-zero padding".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let sides = ["padding-top", "padding-right", "padding-bottom", "padding-left"];
        let snapshot = StyleReader::new(session).snapshot(el, &sides).await;
        let passed = sides
            .iter()
            .filter_map(|p| snapshot.get(*p).and_then(|v| v.as_deref()).and_then(parse_px))
            .any(|px| px > 0.0);
        let message = format!("element {}: {}", el.id(), self.describe());
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

/// Resolved font size meets a minimum.
struct MinFontSize {
    min_px: f64,
}

#[async_trait]
impl Validator for MinFontSize {
    fn describe(&self) -> String {
        format!("font size is at least {:.0}px", self.min_px)
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let size = StyleReader::new(session)
            .property(el, "font-size")
            .await
            .as_deref()
            .and_then(parse_px);
        let passed = size.is_some_and(|s| s >= self.min_px);
        let message = format!(
            "element {}: {} (measured {:?})",
            el.id(),
            self.describe(),
            size,
        );
        let mut result = if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        };
        if let Some(s) = size {
            result = result.with_measured(s);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_the_aspect_labels() {
        let registry = registry();
        for label in ["background", "border-radius", "padding", "font"] {
            assert!(registry.get(label).is_some(), "missing aspect {label}");
        }
        assert!(registry.get("Font").is_some());
    }
}
