//! The browser session boundary.
//!
//! The engine never talks to a browser directly. Everything it needs - DOM
//! queries, computed styles, key presses, viewport changes - goes through the
//! [`BrowserSession`] trait, implemented by the calling test suite over its
//! automation backend (Playwright, CDP, or an in-memory fake in tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by a browser session implementation.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The element handle no longer resolves to a live DOM node.
    #[error("element is no longer attached to the document")]
    Detached,

    /// The selector could not be parsed by the backend.
    #[error("invalid selector: {0}")]
    Selector(String),

    /// Any other backend failure (protocol error, closed page, ...).
    #[error("browser backend error: {0}")]
    Backend(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// An opaque handle to a node in the live document.
///
/// Handles are minted by the session implementation and are only meaningful
/// to it. The engine borrows them for the duration of one check and never
/// assumes they survive a navigation or re-render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    id: String,
}

impl ElementRef {
    /// Create a handle from a backend-specific identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The backend-specific identity string this handle wraps.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Position and size of one element in viewport pixels, at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Right edge in viewport coordinates.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge in viewport coordinates.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal center in viewport coordinates.
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// One live browser page, as seen by the engine.
///
/// Scripts passed to [`evaluate`](BrowserSession::evaluate) must be
/// self-contained function expressions over their explicit arguments: no
/// captured state, nothing resolved outside page context. The engine's own
/// scripts (see [`crate::taborder`] and [`crate::metrics`]) follow that rule
/// and are exported as constants so fakes can recognize them.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Run a function expression in page context and return its
    /// JSON-serializable result. A returned promise is awaited.
    async fn evaluate(&self, script: &str, args: &[Value]) -> SessionResult<Value>;

    /// Resolve a selector to element handles. An empty result is not an
    /// error; a malformed selector is.
    async fn query(&self, selector: &str) -> SessionResult<Vec<ElementRef>>;

    /// Read one resolved computed-style property. `None` means the property
    /// is unset or unknown, which callers treat as "no value", not failure.
    async fn computed_style(&self, el: &ElementRef, property: &str)
    -> SessionResult<Option<String>>;

    /// Read a DOM attribute. `None` means the attribute is absent.
    async fn attribute(&self, el: &ElementRef, name: &str) -> SessionResult<Option<String>>;

    /// Current bounding box, or `None` for an element with no layout.
    async fn bounding_box(&self, el: &ElementRef) -> SessionResult<Option<BoundingBox>>;

    /// Send a key press to the page (e.g. "Tab").
    async fn press_key(&self, key: &str) -> SessionResult<()>;

    /// Move the pointer over an element.
    async fn hover(&self, el: &ElementRef) -> SessionResult<()>;

    /// Click an element.
    async fn click(&self, el: &ElementRef) -> SessionResult<()>;

    /// Resize the viewport.
    async fn set_viewport_size(&self, width: u32, height: u32) -> SessionResult<()>;

    /// Suspend for a fixed settle delay. The engine routes all of its timing
    /// through the session so fakes can run without real clocks.
    async fn wait_for_timeout(&self, ms: u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ref_preserves_identity_string() {
        let el = ElementRef::new("node-42");
        assert_eq!(el.id(), "node-42");
        assert_eq!(el, ElementRef::new("node-42".to_string()));
    }

    #[test]
    fn bounding_box_edges() {
        let b = BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(b.right(), 110.0);
        assert_eq!(b.bottom(), 70.0);
        assert_eq!(b.center_x(), 60.0);
    }
}
