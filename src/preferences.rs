//! Emulated browser-preference validators.
//!
//! The test framework emulates user preferences (reduced motion, dark
//! scheme, forced colors) on the browser context; these rules confirm the
//! page actually sees the emulated preference through `matchMedia`. The
//! element argument is unused but keeps the common validator contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::check::CheckResult;
use crate::registry::{Validator, ValidatorRegistry};
use crate::session::{BrowserSession, ElementRef, SessionResult};

/// Self-contained page script: `(query) => boolean` via `matchMedia`.
pub const MATCH_MEDIA_SCRIPT: &str = "(query) => window.matchMedia(query).matches";

/// The preference registry with the default rules: reduced-motion, dark,
/// forced-colors.
pub fn registry() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new("preference");
    registry.register(
        "reduced-motion",
        Arc::new(MediaQueryMatches {
            query: "(prefers-reduced-motion: reduce)",
        }),
    );
    registry.register(
        "dark",
        Arc::new(MediaQueryMatches {
            query: "(prefers-color-scheme: dark)",
        }),
    );
    registry.register(
        "forced-colors",
        Arc::new(MediaQueryMatches {
            query: "(forced-colors: active)",
        }),
    );
    registry
}

/// Passes when the page reports the media query as matching.
pub struct MediaQueryMatches {
    pub query: &'static str,
}

#[async_trait]
impl Validator for MediaQueryMatches {
    fn describe(&self) -> String {
        format!("page matches media query {:?}", self.query)
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        _el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let value = session
            .evaluate(MATCH_MEDIA_SCRIPT, &[json!(self.query)])
            .await?;
        let passed = value.as_bool().unwrap_or(false);
        let message = format!("{} -> {passed}", self.describe());
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
    fn default_registry_has_the_preference_labels() {
        let registry = registry();
        for label in ["reduced-motion", "dark", "forced-colors"] {
            assert!(registry.get(label).is_some(), "missing preference {label}");
        }
        assert!(registry.get("Dark").is_some());
    }

    #[test]
    fn match_media_script_takes_the_query_as_parameter() {
        assert!(MATCH_MEDIA_SCRIPT.starts_with("(query) =>"));
    }
}
