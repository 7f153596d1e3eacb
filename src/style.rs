//! Computed-style and geometry reads.
//!
//! All reads reflect the current rendered state. Values must not be cached
//! across any simulated interaction or viewport change; styles can change
//! under hover, focus, and resize, so snapshots are re-captured per check.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::debug;

use crate::session::{BoundingBox, BrowserSession, ElementRef};

/// A set of resolved style properties captured at one instant for one
/// element. `None` means the property was unset, unknown, or the read
/// failed transiently - all treated as "no value".
pub type ComputedStyleSnapshot = HashMap<String, Option<String>>;

/// Reads computed styles and bounding boxes through the session.
pub struct StyleReader<'a> {
    session: &'a dyn BrowserSession,
}

impl<'a> StyleReader<'a> {
    pub fn new(session: &'a dyn BrowserSession) -> Self {
        Self { session }
    }

    /// Read one resolved property. A transient failure (element detached
    /// between query and read) degrades to `None` rather than propagating.
    pub async fn property(&self, el: &ElementRef, name: &str) -> Option<String> {
        match self.session.computed_style(el, name).await {
            Ok(value) => value,
            Err(err) => {
                debug!(element = el.id(), property = name, %err, "style read degraded to none");
                None
            }
        }
    }

    /// Capture several independent properties of one element concurrently.
    ///
    /// The reads are dispatched as one batch to cut round-trip latency; all
    /// values reflect the state at the time of dispatch and no ordering
    /// between them may be assumed.
    pub async fn snapshot(&self, el: &ElementRef, names: &[&str]) -> ComputedStyleSnapshot {
        let reads = names.iter().map(|name| async move {
            let value = self.property(el, name).await;
            ((*name).to_string(), value)
        });
        join_all(reads).await.into_iter().collect()
    }

    /// Current bounding box, `None` if the element has no layout or the
    /// read failed transiently.
    pub async fn bounding_box(&self, el: &ElementRef) -> Option<BoundingBox> {
        match self.session.bounding_box(el).await {
            Ok(bounds) => bounds,
            Err(err) => {
                debug!(element = el.id(), %err, "bounding box read degraded to none");
                None
            }
        }
    }
}

/// Self-contained page script: `() => { width, height }` of the viewport.
pub const VIEWPORT_SIZE_SCRIPT: &str =
    "() => ({ width: window.innerWidth, height: window.innerHeight })";

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

/// Read the current viewport size from page context.
pub async fn viewport_size(session: &dyn BrowserSession) -> Option<ViewportSize> {
    match session.evaluate(VIEWPORT_SIZE_SCRIPT, &[]).await {
        Ok(value) => serde_json::from_value(value).ok(),
        Err(err) => {
            debug!(%err, "viewport size read degraded to none");
            None
        }
    }
}

/// Parse a resolved pixel length like `"12px"` or `"0.5px"`.
pub fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse::<f64>().ok()
}

/// Whether a resolved color value is effectively invisible
/// (`transparent` or an `rgba(...)` with zero alpha). Only color keywords
/// count; `none` is not a CSS color and browsers never report it for
/// color-valued properties.
pub fn is_transparent(value: &str) -> bool {
    let v = value.trim().to_ascii_lowercase();
    if v == "transparent" {
        return true;
    }
    if let Some(args) = v.strip_prefix("rgba(").and_then(|rest| rest.strip_suffix(')')) {
        if let Some(alpha) = args.split(',').nth(3) {
            return alpha.trim().parse::<f64>().map(|a| a == 0.0).unwrap_or(false);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_keyword_is_transparent() {
        assert!(is_transparent("transparent"));
        assert!(is_transparent(" Transparent "));
    }

    #[test]
    fn zero_alpha_rgba_is_transparent() {
        assert!(is_transparent("rgba(0, 0, 0, 0)"));
        assert!(is_transparent("rgba(255, 255, 255, 0.0)"));
    }

    #[test]
    fn opaque_values_are_not_transparent() {
        assert!(!is_transparent("rgb(255, 0, 0)"));
        assert!(!is_transparent("rgba(0, 0, 0, 0.5)"));
        assert!(!is_transparent("#ffffff"));
        // `none` is not a color keyword; it must not read as transparent.
        assert!(!is_transparent("none"));
    }

    #[test]
    fn parses_pixel_lengths() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px(" 0.5px "), Some(0.5));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px(""), None);
    }
}
