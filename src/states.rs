//! Interaction state validators: hover, focus, disabled.
//!
//! These rules interact with the element (hover, click-to-focus) and then
//! re-read styles after a settle delay, because a snapshot captured before
//! the interaction no longer describes the rendered state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::check::CheckResult;
use crate::registry::{Validator, ValidatorRegistry};
use crate::session::{BrowserSession, ElementRef, SessionResult};
use crate::style::{StyleReader, parse_px};

/// Settle delay after an interaction before re-reading styles, ms. CSS
/// transitions on marketing sites are typically 100-200 ms.
const INTERACTION_SETTLE_MS: u64 = 150;

const HOVER_SENSITIVE_PROPERTIES: &[&str] = &[
    "cursor",
    "background-color",
    "color",
    "text-decoration-line",
    "box-shadow",
];

/// The interaction-state registry with the default rules: hover, focus,
/// disabled.
pub fn registry() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new("state");
    registry.register("hover", Arc::new(HoverState));
    registry.register("focus", Arc::new(FocusState));
    registry.register("disabled", Arc::new(DisabledState));
    registry
}

/// Hover feedback: hovering must change at least one hover-sensitive
/// property, or the element must already show a pointer cursor.
struct HoverState;

#[async_trait]
impl Validator for HoverState {
    fn describe(&self) -> String {
        "hover produces visible feedback".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let reader = StyleReader::new(session);
        let before = reader.snapshot(el, HOVER_SENSITIVE_PROPERTIES).await;

        session.hover(el).await?;
        session.wait_for_timeout(INTERACTION_SETTLE_MS).await;

        let after = reader.snapshot(el, HOVER_SENSITIVE_PROPERTIES).await;

        let changed: Vec<&str> = HOVER_SENSITIVE_PROPERTIES
            .iter()
            .filter(|p| before.get(**p) != after.get(**p))
            .copied()
            .collect();
        let pointer = after
            .get("cursor")
            .and_then(|v| v.as_deref())
            .is_some_and(|c| c.trim() == "pointer");

        let passed = !changed.is_empty() || pointer;
        let message = format!(
            "element {}: hover feedback (changed {changed:?}, pointer cursor {pointer})",
            el.id(),
        );
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

/// Focus visibility: after focusing, the element shows an outline or a
/// box shadow.
struct FocusState;

#[async_trait]
impl Validator for FocusState {
    fn describe(&self) -> String {
        "focused element shows a visible focus indicator".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        session.click(el).await?;
        session.wait_for_timeout(INTERACTION_SETTLE_MS).await;

        let snapshot = StyleReader::new(session)
            .snapshot(el, &["outline-style", "outline-width", "box-shadow"])
            .await;
        let outline = snapshot
            .get("outline-style")
            .and_then(|v| v.as_deref())
            .is_some_and(|s| s.trim() != "none")
            && snapshot
                .get("outline-width")
                .and_then(|v| v.as_deref())
                .and_then(parse_px)
                .is_some_and(|w| w > 0.0);
        let shadow = snapshot
            .get("box-shadow")
            .and_then(|v| v.as_deref())
            .is_some_and(|s| s.trim() != "none" && !s.trim().is_empty());

        let passed = outline || shadow;
        let message = format!(
            "element {}: focus indicator (outline {outline}, box-shadow {shadow})",
            el.id(),
        );
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

/// Disabled presentation: the element is marked disabled and renders as
/// non-interactive (not-allowed cursor, suppressed pointer events, or
/// reduced opacity).
struct DisabledState;

#[async_trait]
impl Validator for DisabledState {
    fn describe(&self) -> String {
        "element is marked disabled and rendered non-interactive".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let disabled_attr = session.attribute(el, "disabled").await?.is_some();
        let aria_disabled = session
            .attribute(el, "aria-disabled")
            .await?
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let snapshot = StyleReader::new(session)
            .snapshot(el, &["cursor", "pointer-events", "opacity"])
            .await;
        let not_allowed = snapshot
            .get("cursor")
            .and_then(|v| v.as_deref())
            .is_some_and(|c| c.trim() == "not-allowed");
        let no_pointer_events = snapshot
            .get("pointer-events")
            .and_then(|v| v.as_deref())
            .is_some_and(|p| p.trim() == "none");
        let dimmed = snapshot
            .get("opacity")
            .and_then(|v| v.as_deref())
            .and_then(|o| o.trim().parse::<f64>().ok())
            .is_some_and(|o| o < 1.0);

        let marked = disabled_attr || aria_disabled;
        let rendered = not_allowed || no_pointer_events || dimmed;
        let passed = marked && rendered;
        let message = format!(
            "element {}: disabled state (marked {marked}, rendered non-interactive {rendered})",
            el.id(),
        );
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_the_state_labels() {
        let registry = registry();
        for label in ["hover", "focus", "disabled"] {
            assert!(registry.get(label).is_some(), "missing state {label}");
        }
        assert!(registry.get("Hover").is_some());
    }
}
