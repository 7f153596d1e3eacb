//! Responsive adaptation validators.
//!
//! After a viewport change, scenario tables describe what each component
//! should have done: stack its children, hide, scale down to fit, or fall
//! back to a minimal non-interactive rendering. Each label is one predicate
//! over the element's post-resize state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::check::CheckResult;
use crate::registry::{Validator, ValidatorRegistry};
use crate::session::{BrowserSession, ElementRef, SessionResult};
use crate::style::{StyleReader, viewport_size};

/// The adaptation registry with the default rules: stacked, hidden,
/// scaled, disabled/minimal.
pub fn registry() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new("adaptation");
    registry.register("stacked", Arc::new(Stacked));
    registry.register("hidden", Arc::new(Hidden));
    registry.register("scaled", Arc::new(Scaled));
    registry.register("disabled/minimal", Arc::new(Minimal));
    registry
}

/// Single-column flow: a column flex container, a single-column grid, or
/// plain block flow.
struct Stacked;

#[async_trait]
impl Validator for Stacked {
    fn describe(&self) -> String {
        "element lays out as a single vertical column".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let snapshot = StyleReader::new(session)
            .snapshot(el, &["display", "flex-direction", "grid-template-columns"])
            .await;
        let display = snapshot
            .get("display")
            .and_then(|v| v.as_deref())
            .unwrap_or("")
            .trim()
            .to_string();
        let column_flex = display.contains("flex")
            && snapshot
                .get("flex-direction")
                .and_then(|v| v.as_deref())
                .is_some_and(|d| d.contains("column"));
        let single_column_grid = display.contains("grid")
            && snapshot
                .get("grid-template-columns")
                .and_then(|v| v.as_deref())
                .is_some_and(|c| {
                    let c = c.trim();
                    c == "none" || !c.contains(' ')
                });
        let block_flow = display == "block";

        let passed = column_flex || single_column_grid || block_flow;
        let message = format!(
            "element {}: stacked layout (display {display:?}, column flex {column_flex}, \
             single-column grid {single_column_grid})",
            el.id(),
        );
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

/// Removed from the rendered page: `display: none`, `visibility: hidden`,
/// or a zero-size (or missing) bounding box.
struct Hidden;

#[async_trait]
impl Validator for Hidden {
    fn describe(&self) -> String {
        "element is hidden from the rendered page".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let reader = StyleReader::new(session);
        let snapshot = reader.snapshot(el, &["display", "visibility"]).await;
        let display_none = snapshot
            .get("display")
            .and_then(|v| v.as_deref())
            .is_some_and(|d| d.trim() == "none");
        let visibility_hidden = snapshot
            .get("visibility")
            .and_then(|v| v.as_deref())
            .is_some_and(|d| d.trim() == "hidden");
        let zero_box = match reader.bounding_box(el).await {
            None => true,
            Some(b) => b.width == 0.0 || b.height == 0.0,
        };

        let passed = display_none || visibility_hidden || zero_box;
        let message = format!(
            "element {}: hidden (display:none {display_none}, visibility:hidden {visibility_hidden}, \
             zero box {zero_box})",
            el.id(),
        );
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

/// Fits the viewport horizontally; nothing overflows off-screen.
struct Scaled;

/// Sub-pixel slack when comparing box edges to the viewport.
const FIT_TOLERANCE_PX: f64 = 1.0;

#[async_trait]
impl Validator for Scaled {
    fn describe(&self) -> String {
        "element fits within the viewport width".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let bounds = StyleReader::new(session).bounding_box(el).await;
        let viewport = viewport_size(session).await;
        let (passed, detail) = match (bounds, viewport) {
            (Some(b), Some(v)) => (
                b.x >= -FIT_TOLERANCE_PX && b.right() <= v.width + FIT_TOLERANCE_PX,
                format!("box [{:.0}, {:.0}] in viewport width {:.0}", b.x, b.right(), v.width),
            ),
            // A box or viewport we cannot read fails the specific sub-check
            // with a diagnostic, never crashes the run.
            _ => (false, "box or viewport unreadable".to_string()),
        };
        let message = format!("element {}: scaled to fit ({detail})", el.id());
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

/// Reduced to a minimal, non-interactive rendering: hidden outright or with
/// pointer interaction suppressed.
struct Minimal;

#[async_trait]
impl Validator for Minimal {
    fn describe(&self) -> String {
        "element is reduced to a minimal non-interactive rendering".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let snapshot = StyleReader::new(session)
            .snapshot(el, &["display", "visibility", "pointer-events"])
            .await;
        let hidden = snapshot
            .get("display")
            .and_then(|v| v.as_deref())
            .is_some_and(|d| d.trim() == "none")
            || snapshot
                .get("visibility")
                .and_then(|v| v.as_deref())
                .is_some_and(|d| d.trim() == "hidden");
        let inert = snapshot
            .get("pointer-events")
            .and_then(|v| v.as_deref())
            .is_some_and(|p| p.trim() == "none");

        let passed = hidden || inert;
        let message = format!(
            "element {}: minimal rendering (hidden {hidden}, pointer events suppressed {inert})",
            el.id(),
        );
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}
