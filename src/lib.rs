//! a11yprobe - Accessibility and responsive compliance checks for browser-driven test suites.
//!
//! This crate implements the verification engine behind an end-to-end UI test
//! suite: WCAG contrast ratios, keyboard tab-order analysis, web-vitals
//! collection, and label-dispatched validation rules. It does not drive a
//! browser itself; callers supply a [`session::BrowserSession`] implementation
//! (Playwright, CDP, or an in-memory fake) and the engine issues all DOM reads
//! and interactions through it.

pub mod adaptation;
pub mod check;
pub mod contrast;
pub mod cues;
pub mod layout;
pub mod metrics;
pub mod orchestrator;
pub mod preferences;
pub mod registry;
pub mod session;
pub mod spacing;
pub mod states;
pub mod style;
pub mod styles;
pub mod taborder;
pub mod visual;

pub use check::{CheckError, CheckResult};
pub use orchestrator::Orchestrator;
pub use session::{BoundingBox, BrowserSession, ElementRef, SessionError};
