//! Image and SVG accessibility-role validators.
//!
//! Meaningful imagery needs a text alternative; decorative imagery must be
//! hidden from assistive technology. These rules read attributes, not
//! styles.

use std::sync::Arc;

use async_trait::async_trait;

use crate::check::CheckResult;
use crate::registry::{Validator, ValidatorRegistry};
use crate::session::{BrowserSession, ElementRef, SessionResult};

/// The visual-element registry with the default rules: image, svg, icon.
pub fn registry() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new("visual");
    registry.register("image", Arc::new(ImageAlt));
    registry.register("svg", Arc::new(SvgRole));
    registry.register("icon", Arc::new(DecorativeIcon));
    registry
}

async fn attr(
    session: &dyn BrowserSession,
    el: &ElementRef,
    name: &str,
) -> SessionResult<Option<String>> {
    Ok(session
        .attribute(el, name)
        .await?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// An `img` either carries non-empty alt text or is explicitly marked
/// decorative (`alt=""` plus presentation role or aria-hidden).
struct ImageAlt;

#[async_trait]
impl Validator for ImageAlt {
    fn describe(&self) -> String {
        "image has alt text or is explicitly decorative".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let alt = session.attribute(el, "alt").await?;
        let has_alt_text = alt.as_deref().is_some_and(|v| !v.trim().is_empty());
        let presentation = attr(session, el, "role")
            .await?
            .is_some_and(|r| r.eq_ignore_ascii_case("presentation") || r.eq_ignore_ascii_case("none"));
        let aria_hidden = attr(session, el, "aria-hidden")
            .await?
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        // Empty alt alone still signals "decorative" only with a backing
        // role or aria-hidden; a missing alt attribute never passes.
        let decorative = alt.is_some() && !has_alt_text && (presentation || aria_hidden);

        let passed = has_alt_text || decorative;
        let message = format!(
            "element {}: image text alternative (alt text {has_alt_text}, decorative {decorative})",
            el.id(),
        );
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

/// An inline `svg` exposed as an image: `role="img"` plus an accessible
/// name from aria-label or aria-labelledby.
struct SvgRole;

#[async_trait]
impl Validator for SvgRole {
    fn describe(&self) -> String {
        "svg has role=img and an accessible name".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let role_img = attr(session, el, "role")
            .await?
            .is_some_and(|r| r.eq_ignore_ascii_case("img"));
        let named = attr(session, el, "aria-label").await?.is_some()
            || attr(session, el, "aria-labelledby").await?.is_some();

        let passed = role_img && named;
        let message = format!(
            "element {}: svg accessibility (role=img {role_img}, accessible name {named})",
            el.id(),
        );
        Ok(if passed {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}

/// A decorative icon is hidden from assistive technology.
struct DecorativeIcon;

#[async_trait]
impl Validator for DecorativeIcon {
    fn describe(&self) -> String {
        "decorative icon is aria-hidden".to_string()
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let hidden = attr(session, el, "aria-hidden")
            .await?
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let message = format!("element {}: {} -> {hidden}", el.id(), self.describe());
        Ok(if hidden {
            CheckResult::pass(message)
        } else {
            CheckResult::fail(message)
        })
    }
}
