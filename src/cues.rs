//! Visual cue validators.
//!
//! A "cue" is one visual signal that an element is meaningful or
//! interactive: a distinct color, an underline, an icon, a pointer cursor.
//! Scenarios never require one particular cue; they require that *enough*
//! of them are present, so the composite [`cue_count`] check counts truthy
//! cues against a threshold.

use std::sync::Arc;

use async_trait::async_trait;

use crate::check::{CheckError, CheckResult};
use crate::registry::{StyleContains, StyleEquals, StyleOpaque, StyleSet, Validator, ValidatorRegistry};
use crate::session::{BrowserSession, ElementRef, SessionResult};
use crate::style::{StyleReader, is_transparent, parse_px};

/// The cue registry with the default rule set: color, background, border,
/// underline, icon, cursor.
pub fn registry() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new("cue");
    registry.register("color", Arc::new(StyleOpaque { property: "color" }));
    registry.register(
        "background",
        Arc::new(StyleOpaque {
            property: "background-color",
        }),
    );
    registry.register("border", Arc::new(BorderCue));
    registry.register(
        "underline",
        Arc::new(StyleContains {
            property: "text-decoration-line",
            needle: "underline",
        }),
    );
    // Heuristic: an inline icon usually arrives as a background image.
    registry.register(
        "icon",
        Arc::new(StyleSet {
            property: "background-image",
        }),
    );
    registry.register(
        "cursor",
        Arc::new(StyleEquals {
            property: "cursor",
            expected: "pointer",
        }),
    );
    registry
}

/// A visible border: non-zero width and a non-transparent color.
struct BorderCue;

#[async_trait]
impl Validator for BorderCue {
    fn describe(&self) -> String {
        "border is visible (non-zero width, non-transparent color)".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let snapshot = StyleReader::new(session)
            .snapshot(el, &["border-top-width", "border-top-color"])
            .await;
        let width_visible = snapshot
            .get("border-top-width")
            .and_then(|v| v.as_deref())
            .and_then(parse_px)
            .is_some_and(|w| w > 0.0);
        let color_visible = snapshot
            .get("border-top-color")
            .and_then(|v| v.as_deref())
            .is_some_and(|c| !is_transparent(c));
        let passed = width_visible && color_visible;
        let message = format!("element {}: {}", el.id(), self.describe());
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

/// Count how many of the requested cue labels hold for one element and
/// compare against a minimum. No individual cue is required.
///
/// Unknown labels follow the registry's miss policy; under `Skip` they
/// simply do not contribute to the count.
pub async fn cue_count(
    registry: &ValidatorRegistry,
    session: &dyn BrowserSession,
    el: &ElementRef,
    labels: &[&str],
    minimum: usize,
) -> Result<CheckResult, CheckError> {
    let mut present = 0usize;
    let mut held: Vec<&str> = Vec::new();
    for label in labels {
        if let Some(result) = registry.apply(label, session, el).await? {
            if result.passed {
                present += 1;
                held.push(label);
            }
        }
    }
    let message = format!(
        "element {}: {present} of {} requested cues present ({held:?}), minimum {minimum}",
        el.id(),
        labels.len(),
    );
    Ok(if present >= minimum {
        CheckResult::pass(message).with_measured(present as f64)
    } else {
        CheckResult::fail(message).with_measured(present as f64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_the_cue_labels() {
        let registry = registry();
        for label in ["color", "background", "border", "underline", "icon", "cursor"] {
            assert!(registry.get(label).is_some(), "missing cue {label}");
        }
        assert!(registry.get("Cursor").is_some());
        assert!(registry.get("sparkle").is_none());
    }
}
