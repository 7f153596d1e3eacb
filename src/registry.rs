//! Label-dispatched validation rules.
//!
//! Scenario tables name their requirements with semantic labels ("hover",
//! "icon", "disabled/minimal"); each check category owns a
//! [`ValidatorRegistry`] mapping those labels, case-insensitively, to one
//! single-element predicate. Registration is explicit and centralized in the
//! category modules; nothing is discovered implicitly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::check::{CheckError, CheckResult};
use crate::session::{BrowserSession, ElementRef, SessionResult};
use crate::style::{StyleReader, is_transparent};

/// One self-contained validation predicate over a single element.
#[async_trait]
pub trait Validator: Send + Sync {
    /// The expectation this validator enforces, for diagnostics.
    fn describe(&self) -> String;

    /// Evaluate the predicate against one element.
    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult>;
}

/// What a registry does when a label lookup misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissPolicy {
    /// Unknown labels are errors. Default; right for requirements a
    /// scenario explicitly names.
    #[default]
    Strict,
    /// Unknown labels are logged and skipped. For optional or cosmetic
    /// rule sets.
    Skip,
}

/// A category's label -> validator map. Built once at construction, lookups
/// case-insensitive, late registration permitted but not needed after setup.
pub struct ValidatorRegistry {
    category: &'static str,
    policy: MissPolicy,
    entries: HashMap<String, Arc<dyn Validator>>,
}

impl ValidatorRegistry {
    /// An empty registry with the strict miss policy.
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            policy: MissPolicy::Strict,
            entries: HashMap::new(),
        }
    }

    /// Override the miss policy.
    pub fn with_policy(mut self, policy: MissPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The category name this registry dispatches for.
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Insert or overwrite a validator under a label. Labels are stored
    /// lower-cased.
    pub fn register(&mut self, label: &str, validator: Arc<dyn Validator>) {
        self.entries.insert(label.to_lowercase(), validator);
    }

    /// Look up a validator, case-insensitively.
    pub fn get(&self, label: &str) -> Option<&Arc<dyn Validator>> {
        self.entries.get(&label.to_lowercase())
    }

    /// Run the validator registered under `label` against one element.
    ///
    /// A miss follows the registry's policy: `Strict` yields
    /// [`CheckError::UnknownRule`], `Skip` logs a warning and yields
    /// `Ok(None)`.
    pub async fn apply(
        &self,
        label: &str,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> Result<Option<CheckResult>, CheckError> {
        match self.get(label) {
            Some(validator) => Ok(Some(validator.validate(session, el).await?)),
            None => match self.policy {
                MissPolicy::Strict => Err(CheckError::UnknownRule {
                    category: self.category.to_string(),
                    label: label.to_string(),
                }),
                MissPolicy::Skip => {
                    warn!(category = self.category, label, "unknown rule skipped");
                    Ok(None)
                }
            },
        }
    }
}

fn rule_verdict(
    el: &ElementRef,
    expectation: &str,
    observed: Option<&str>,
    passed: bool,
) -> CheckResult {
    let observed = observed.unwrap_or("<no value>");
    let message = format!("element {}: {expectation} (observed {observed:?})", el.id());
    if passed {
        CheckResult::pass(message)
    } else {
        CheckResult::fail(message)
    }
}

/// Passes when a computed property equals an expected value
/// (trimmed, case-insensitive).
pub struct StyleEquals {
    pub property: &'static str,
    pub expected: &'static str,
}

#[async_trait]
impl Validator for StyleEquals {
    fn describe(&self) -> String {
        format!("computed {} equals {:?}", self.property, self.expected)
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let value = StyleReader::new(session).property(el, self.property).await;
        let passed = value
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(self.expected));
        Ok(rule_verdict(el, &self.describe(), value.as_deref(), passed))
    }
}

/// Passes when a computed property contains a substring
/// (case-insensitive). Useful for multi-valued properties like
/// `text-decoration`.
pub struct StyleContains {
    pub property: &'static str,
    pub needle: &'static str,
}

#[async_trait]
impl Validator for StyleContains {
    fn describe(&self) -> String {
        format!("computed {} contains {:?}", self.property, self.needle)
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let value = StyleReader::new(session).property(el, self.property).await;
        let passed = value
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(&self.needle.to_lowercase()));
        Ok(rule_verdict(el, &self.describe(), value.as_deref(), passed))
    }
}

/// Passes when a color-valued property is present and not transparent.
pub struct StyleOpaque {
    pub property: &'static str,
}

#[async_trait]
impl Validator for StyleOpaque {
    fn describe(&self) -> String {
        format!("computed {} is a non-transparent color", self.property)
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let value = StyleReader::new(session).property(el, self.property).await;
        let passed = value.as_deref().is_some_and(|v| !is_transparent(v));
        Ok(rule_verdict(el, &self.describe(), value.as_deref(), passed))
    }
}

/// Passes when a property resolves to something other than its "absent"
/// keyword (`none`, `normal`, `0px`, empty).
pub struct StyleSet {
    pub property: &'static str,
}

#[async_trait]
impl Validator for StyleSet {
    fn describe(&self) -> String {
        format!("computed {} is set", self.property)
    }

    async fn validate(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
    ) -> SessionResult<CheckResult> {
        let value = StyleReader::new(session).property(el, self.property).await;
        let passed = value.as_deref().is_some_and(|v| {
            let v = v.trim().to_lowercase();
            !v.is_empty() && v != "none" && v != "normal" && v != "0px"
        });
        Ok(rule_verdict(el, &self.describe(), value.as_deref(), passed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    use crate::session::{BoundingBox, SessionError};

    struct AlwaysPass;

    #[async_trait]
    impl Validator for AlwaysPass {
        fn describe(&self) -> String {
            "always passes".to_string()
        }

        async fn validate(
            &self,
            _session: &dyn BrowserSession,
            _el: &ElementRef,
        ) -> SessionResult<CheckResult> {
            Ok(CheckResult::pass("always passes"))
        }
    }

    struct NullSession;

    #[async_trait]
    impl BrowserSession for NullSession {
        async fn evaluate(&self, _script: &str, _args: &[Value]) -> SessionResult<Value> {
            Ok(Value::Null)
        }
        async fn query(&self, _selector: &str) -> SessionResult<Vec<ElementRef>> {
            Ok(Vec::new())
        }
        async fn computed_style(
            &self,
            _el: &ElementRef,
            _property: &str,
        ) -> SessionResult<Option<String>> {
            Ok(None)
        }
        async fn attribute(
            &self,
            _el: &ElementRef,
            _name: &str,
        ) -> SessionResult<Option<String>> {
            Ok(None)
        }
        async fn bounding_box(&self, _el: &ElementRef) -> SessionResult<Option<BoundingBox>> {
            Ok(None)
        }
        async fn press_key(&self, _key: &str) -> SessionResult<()> {
            Err(SessionError::Backend("not supported".to_string()))
        }
        async fn hover(&self, _el: &ElementRef) -> SessionResult<()> {
            Ok(())
        }
        async fn click(&self, _el: &ElementRef) -> SessionResult<()> {
            Ok(())
        }
        async fn set_viewport_size(&self, _width: u32, _height: u32) -> SessionResult<()> {
            Ok(())
        }
        async fn wait_for_timeout(&self, _ms: u64) {}
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = ValidatorRegistry::new("cue");
        registry.register("Hover", Arc::new(AlwaysPass));

        assert!(registry.get("hover").is_some());
        assert!(registry.get("HOVER").is_some());
        // Same validator behind both spellings.
        assert!(Arc::ptr_eq(
            registry.get("hover").unwrap(),
            registry.get("Hover").unwrap()
        ));
        assert!(registry.get("unknown-label").is_none());
    }

    #[test]
    fn register_overwrites_existing_label() {
        let mut registry = ValidatorRegistry::new("cue");
        let first: Arc<dyn Validator> = Arc::new(AlwaysPass);
        let second: Arc<dyn Validator> = Arc::new(AlwaysPass);
        registry.register("icon", Arc::clone(&first));
        registry.register("ICON", Arc::clone(&second));

        assert!(Arc::ptr_eq(registry.get("icon").unwrap(), &second));
    }

    #[tokio::test]
    async fn strict_miss_is_an_error() {
        let registry = ValidatorRegistry::new("cue");
        let result = registry
            .apply("sparkle", &NullSession, &ElementRef::new("e1"))
            .await;
        assert!(matches!(
            result,
            Err(CheckError::UnknownRule { category, label })
                if category == "cue" && label == "sparkle"
        ));
    }

    #[tokio::test]
    async fn skip_miss_yields_none() {
        let registry = ValidatorRegistry::new("cue").with_policy(MissPolicy::Skip);
        let result = registry
            .apply("sparkle", &NullSession, &ElementRef::new("e1"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn apply_runs_registered_validator() {
        let mut registry = ValidatorRegistry::new("cue");
        registry.register("hover", Arc::new(AlwaysPass));
        let result = registry
            .apply("hover", &NullSession, &ElementRef::new("e1"))
            .await
            .unwrap();
        assert!(result.unwrap().passed);
    }

    #[tokio::test]
    async fn style_rules_fail_on_missing_value() {
        let el = ElementRef::new("e1");
        let equals = StyleEquals {
            property: "cursor",
            expected: "pointer",
        };
        assert!(!equals.validate(&NullSession, &el).await.unwrap().passed);

        let opaque = StyleOpaque {
            property: "background-color",
        };
        assert!(!opaque.validate(&NullSession, &el).await.unwrap().passed);
    }
}
