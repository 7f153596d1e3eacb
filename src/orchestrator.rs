//! The compliance orchestrator.
//!
//! Thin composition layer over the accessor, contrast calculator, tab-order
//! analyzer, metrics collector, and category registries. The step-definition
//! layer asks named questions ("does selector X meet contrast 4.5", "is the
//! page keyboard-accessible") and gets back one [`CheckResult`] per
//! question. The orchestrator owns no state beyond the registries and the
//! tab-order configuration it was constructed with.

use tracing::debug;

use crate::check::{CheckError, CheckOutcome, CheckResult};
use crate::contrast;
use crate::metrics::{MetricsCollector, PageMetrics};
use crate::registry::ValidatorRegistry;
use crate::session::{BrowserSession, ElementRef, SessionResult};
use crate::style::StyleReader;
use crate::taborder::{TabOrderAnalyzer, TabOrderConfig};
use crate::{adaptation, cues, layout, preferences, spacing, states, styles, visual};

/// Settle delay after a viewport resize before reading adapted state, ms.
const RESIZE_SETTLE_MS: u64 = 150;

/// The check categories the orchestrator can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Cue,
    State,
    Adaptation,
    Layout,
    Spacing,
    Style,
    Preference,
    Visual,
}

/// Routes named checks to the right component and aggregates results.
pub struct Orchestrator {
    cues: ValidatorRegistry,
    states: ValidatorRegistry,
    adaptation: ValidatorRegistry,
    layout: ValidatorRegistry,
    spacing: ValidatorRegistry,
    styles: ValidatorRegistry,
    preferences: ValidatorRegistry,
    visual: ValidatorRegistry,
    tab_config: TabOrderConfig,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Orchestrator {
    /// An orchestrator with every category's default rule set and the
    /// default tab-order tuning.
    pub fn with_defaults() -> Self {
        Self {
            cues: cues::registry(),
            states: states::registry(),
            adaptation: adaptation::registry(),
            layout: layout::registry(),
            spacing: spacing::registry(),
            styles: styles::registry(),
            preferences: preferences::registry(),
            visual: visual::registry(),
            tab_config: TabOrderConfig::default(),
        }
    }

    /// Override the tab-order tuning.
    pub fn with_tab_config(mut self, config: TabOrderConfig) -> Self {
        self.tab_config = config;
        self
    }

    /// The registry behind a category, for inspection.
    pub fn registry(&self, category: Category) -> &ValidatorRegistry {
        match category {
            Category::Cue => &self.cues,
            Category::State => &self.states,
            Category::Adaptation => &self.adaptation,
            Category::Layout => &self.layout,
            Category::Spacing => &self.spacing,
            Category::Style => &self.styles,
            Category::Preference => &self.preferences,
            Category::Visual => &self.visual,
        }
    }

    /// Mutable registry access, for late registration or a different miss
    /// policy during setup.
    pub fn registry_mut(&mut self, category: Category) -> &mut ValidatorRegistry {
        match category {
            Category::Cue => &mut self.cues,
            Category::State => &mut self.states,
            Category::Adaptation => &mut self.adaptation,
            Category::Layout => &mut self.layout,
            Category::Spacing => &mut self.spacing,
            Category::Style => &mut self.styles,
            Category::Preference => &mut self.preferences,
            Category::Visual => &mut self.visual,
        }
    }

    /// Run one named rule against one element. `Ok(None)` means the rule was
    /// unknown and the registry's policy is to skip.
    pub async fn check_rule(
        &self,
        session: &dyn BrowserSession,
        category: Category,
        label: &str,
        el: &ElementRef,
    ) -> Result<Option<CheckResult>, CheckError> {
        self.registry(category).apply(label, session, el).await
    }

    /// Contrast ratio of one element's resolved foreground over its
    /// resolved background, against a threshold.
    pub async fn check_element_contrast(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
        threshold: f64,
    ) -> CheckOutcome {
        let ratio = element_contrast(session, el).await;
        let message = format!(
            "element {}: contrast {ratio:.2} against threshold {threshold}",
            el.id(),
        );
        Ok(if ratio >= threshold {
            CheckResult::pass(message).with_measured(ratio)
        } else {
            CheckResult::fail(message).with_measured(ratio)
        })
    }

    /// WCAG contrast of every element matching `selector` against a
    /// threshold. All matched elements must meet it; the measured value is
    /// the worst ratio seen.
    pub async fn check_contrast(
        &self,
        session: &dyn BrowserSession,
        selector: &str,
        threshold: f64,
    ) -> CheckOutcome {
        let elements = session.query(selector).await?;
        if elements.is_empty() {
            return Ok(CheckResult::fail(format!(
                "contrast check: no elements matched selector {selector:?}"
            )));
        }

        let mut worst: Option<(f64, ElementRef)> = None;
        for el in &elements {
            let ratio = element_contrast(session, el).await;
            if worst.as_ref().is_none_or(|(w, _)| ratio < *w) {
                worst = Some((ratio, el.clone()));
            }
        }

        // Non-empty element list, so worst is always set.
        let Some((ratio, el)) = worst else {
            return Err(CheckError::Config(format!(
                "contrast check over {selector:?} produced no measurements"
            )));
        };
        let message = format!(
            "selector {selector:?}: worst contrast {ratio:.2} on element {} against threshold {threshold}",
            el.id(),
        );
        Ok(if ratio >= threshold {
            CheckResult::pass(message).with_measured(ratio)
        } else {
            CheckResult::fail(message).with_measured(ratio)
        })
    }

    /// Keyboard accessibility of the page: no focus trap, and tab-order
    /// coverage above the size-dependent threshold. A page with no
    /// focusable elements passes vacuously.
    pub async fn check_keyboard_accessibility(
        &self,
        session: &dyn BrowserSession,
    ) -> CheckOutcome {
        let analyzer = TabOrderAnalyzer::with_config(session, self.tab_config.clone());
        let expected = analyzer.focusable_count().await?;
        if expected == 0 {
            return Ok(CheckResult::pass(
                "no focusable elements; keyboard accessibility passes vacuously",
            )
            .with_measured(1.0));
        }

        // One traversal answers both questions; Tab presses and settle
        // delays are not free against a real browser.
        let traversal = analyzer.traverse(expected).await?;
        let trap = analyzer.trap_verdict(&traversal, expected);
        if !trap.passed {
            return Ok(trap);
        }
        let coverage = analyzer.coverage_verdict(&traversal, expected);
        let message = format!("{}; {}", trap.message, coverage.message);
        Ok(CheckResult {
            passed: coverage.passed,
            message,
            measured: coverage.measured,
        })
    }

    /// Tab-order coverage alone.
    pub async fn check_tab_order_coverage(&self, session: &dyn BrowserSession) -> CheckOutcome {
        let analyzer = TabOrderAnalyzer::with_config(session, self.tab_config.clone());
        let expected = analyzer.focusable_count().await?;
        Ok(analyzer.coverage(expected).await?)
    }

    /// Composite cue check: at least `minimum` of the requested cue labels
    /// must hold on the element.
    pub async fn check_cue_count(
        &self,
        session: &dyn BrowserSession,
        el: &ElementRef,
        labels: &[&str],
        minimum: usize,
    ) -> CheckOutcome {
        cues::cue_count(&self.cues, session, el, labels, minimum).await
    }

    /// Resize the viewport, let the page settle, and check the named
    /// adaptation rule on every element matching `selector`.
    pub async fn check_responsive(
        &self,
        session: &dyn BrowserSession,
        width: u32,
        height: u32,
        label: &str,
        selector: &str,
    ) -> CheckOutcome {
        session.set_viewport_size(width, height).await?;
        session.wait_for_timeout(RESIZE_SETTLE_MS).await;

        let elements = session.query(selector).await?;
        if elements.is_empty() {
            return Ok(CheckResult::fail(format!(
                "responsive check at {width}x{height}: no elements matched selector {selector:?}"
            )));
        }

        let mut failures: Vec<String> = Vec::new();
        let mut skipped = true;
        for el in &elements {
            if let Some(result) = self.adaptation.apply(label, session, el).await? {
                skipped = false;
                if !result.passed {
                    failures.push(result.message);
                }
            }
        }
        if skipped {
            return Ok(CheckResult::pass(format!(
                "responsive check at {width}x{height}: rule {label:?} skipped for {selector:?}"
            )));
        }
        Ok(if failures.is_empty() {
            CheckResult::pass(format!(
                "selector {selector:?} satisfies {label:?} at {width}x{height} \
                 ({} elements checked)",
                elements.len(),
            ))
        } else {
            CheckResult::fail(format!(
                "selector {selector:?} violates {label:?} at {width}x{height}: {}",
                failures.join("; "),
            ))
        })
    }

    /// Current web-vitals, with the collector's bounded-time fallback.
    pub async fn collect_metrics(&self, session: &dyn BrowserSession) -> SessionResult<PageMetrics> {
        MetricsCollector::new(session).collect().await
    }
}

/// Measure one element's contrast from a fresh style snapshot. Unreadable
/// colors degrade to empty strings and a degenerate low ratio.
async fn element_contrast(session: &dyn BrowserSession, el: &ElementRef) -> f64 {
    let snapshot = StyleReader::new(session)
        .snapshot(el, &["color", "background-color"])
        .await;
    let fg = snapshot
        .get("color")
        .and_then(|v| v.clone())
        .unwrap_or_default();
    let bg = snapshot
        .get("background-color")
        .and_then(|v| v.clone())
        .unwrap_or_default();
    let ratio = contrast::contrast_ratio(&fg, &bg);
    debug!(element = el.id(), %fg, %bg, ratio, "contrast measured");
    ratio
}
