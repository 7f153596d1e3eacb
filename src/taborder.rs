//! Keyboard tab-order traversal analysis.
//!
//! Simulates sequential Tab-key navigation and answers two questions: is
//! there a keyboard trap, and does traversal cover enough of the focusable
//! elements. The traversal records a heuristic [`ElementIdentity`] per step
//! rather than holding live handles, because the page may re-render between
//! presses.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::check::CheckResult;
use crate::session::{BrowserSession, SessionResult};

/// Selector for elements reachable by Tab alone.
pub const FOCUSABLE_SELECTOR: &str =
    "a[href], button, input, select, textarea, [tabindex]:not([tabindex='-1'])";

/// Self-contained page script: `() => void`. Resets focus to the document
/// body so every traversal starts from the same anchor.
pub const FOCUS_RESET_SCRIPT: &str = r#"() => {
    if (document.activeElement && document.activeElement !== document.body) {
        document.activeElement.blur();
    }
    document.body.focus();
}"#;

/// Self-contained page script: `() => identity`. Captures the identity
/// fields of the currently focused element. Default for
/// [`TabOrderConfig::identity_script`].
pub const FOCUSED_IDENTITY_SCRIPT: &str = r#"() => {
    const el = document.activeElement || document.body;
    return {
        tag: el.tagName.toLowerCase(),
        role: el.getAttribute('role') || '',
        input_type: el.getAttribute('type') || '',
        dom_id: el.id || '',
        label: (el.getAttribute('aria-label') || '').slice(0, 40),
        text: (el.textContent || '').trim().slice(0, 20)
    };
}"#;

const LABEL_TRUNCATE: usize = 40;
const TEXT_TRUNCATE: usize = 20;

/// A composite key that recognizes "the same" element across repeated focus
/// observations without retaining a live reference.
///
/// This is a heuristic: two distinct but similar elements (same tag, role,
/// id-less, same short text) collide, and one element whose text changes
/// between visits splits. Both risks are accepted; the capture script is
/// injectable through [`TabOrderConfig`] for suites that need a sharper key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ElementIdentity {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub input_type: String,
    #[serde(default)]
    pub dom_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub text: String,
}

impl ElementIdentity {
    /// Decode an identity from a page-script result, truncating the free-text
    /// fields. An undecodable payload becomes the default (anchor-like)
    /// identity.
    pub fn from_value(value: serde_json::Value) -> Self {
        let mut identity: Self = serde_json::from_value(value).unwrap_or_else(|err| {
            debug!(%err, "identity payload did not deserialize; treating as anchor");
            Self::default()
        });
        identity.label = truncate_chars(&identity.label, LABEL_TRUNCATE);
        identity.text = truncate_chars(&identity.text, TEXT_TRUNCATE);
        identity
    }

    /// Whether this identity is the traversal anchor (document body/root or
    /// an empty capture).
    pub fn is_anchor(&self) -> bool {
        matches!(self.tag.as_str(), "" | "body" | "html")
    }
}

impl fmt::Display for ElementIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anchor() {
            return write!(f, "<anchor>");
        }
        write!(f, "{}", self.tag)?;
        if !self.dom_id.is_empty() {
            write!(f, "#{}", self.dom_id)?;
        }
        if !self.role.is_empty() {
            write!(f, "[role={}]", self.role)?;
        }
        if !self.text.is_empty() {
            write!(f, " \"{}\"", self.text)?;
        }
        Ok(())
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Tuning for the traversal state machine. The stuck-loop thresholds are
/// empirical defaults, not laws; suites with unusual focus behavior should
/// adjust them.
#[derive(Debug, Clone)]
pub struct TabOrderConfig {
    /// Settle delay after each Tab press, ms.
    pub settle_delay_ms: u64,
    /// A revisit within fewer than this many steps counts toward a stuck loop.
    pub stuck_revisit_window: usize,
    /// Stuck loops are only flagged while fewer than this many distinct
    /// identities have been seen (oscillation, not a healthy full cycle).
    pub stuck_ledger_limit: usize,
    /// Steps past the expected element count before a return to the anchor
    /// counts as a completed cycle rather than never having left it.
    pub cycle_grace_steps: usize,
    /// Hard cap on the step budget.
    pub max_step_cap: usize,
    /// Page script capturing the focused element's identity.
    pub identity_script: Cow<'static, str>,
}

impl Default for TabOrderConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 50,
            stuck_revisit_window: 3,
            stuck_ledger_limit: 5,
            cycle_grace_steps: 2,
            max_step_cap: 50,
            identity_script: Cow::Borrowed(FOCUSED_IDENTITY_SCRIPT),
        }
    }
}

impl TabOrderConfig {
    /// Step budget for a page with the given number of focusable elements.
    pub fn step_budget(&self, expected: usize) -> usize {
        (2 * expected + 10).min(self.max_step_cap)
    }
}

/// Why a traversal stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalEnd {
    /// Focus returned to the anchor after a full pass over the page.
    CycleComplete,
    /// The same identity recurred within the revisit window while the
    /// ledger was still small: focus is oscillating, not progressing.
    StuckLoop(ElementIdentity),
    /// The step budget ran out.
    Exhausted,
}

/// The record of one traversal.
#[derive(Debug, Clone)]
pub struct TabTraversal {
    /// Tab presses issued.
    pub steps: usize,
    /// Distinct non-anchor identities observed, in first-seen order.
    pub order: Vec<ElementIdentity>,
    /// Why the traversal stopped.
    pub end: TraversalEnd,
}

impl TabTraversal {
    /// Number of distinct elements reached.
    pub fn distinct_visited(&self) -> usize {
        self.order.len()
    }
}

/// Drives Tab-key traversals through the session.
pub struct TabOrderAnalyzer<'a> {
    session: &'a dyn BrowserSession,
    config: TabOrderConfig,
}

impl<'a> TabOrderAnalyzer<'a> {
    pub fn new(session: &'a dyn BrowserSession) -> Self {
        Self {
            session,
            config: TabOrderConfig::default(),
        }
    }

    pub fn with_config(session: &'a dyn BrowserSession, config: TabOrderConfig) -> Self {
        Self { session, config }
    }

    /// Count the elements reachable by Tab, per [`FOCUSABLE_SELECTOR`].
    pub async fn focusable_count(&self) -> SessionResult<usize> {
        Ok(self.session.query(FOCUSABLE_SELECTOR).await?.len())
    }

    /// Run one bounded traversal from a reset focus anchor.
    ///
    /// Stop conditions, checked after every step in priority order:
    /// cycle-complete, stuck loop, step-budget exhaustion.
    pub async fn traverse(&self, expected: usize) -> SessionResult<TabTraversal> {
        self.session.evaluate(FOCUS_RESET_SCRIPT, &[]).await?;

        let budget = self.config.step_budget(expected);
        // VisitLedger: identity -> first-seen step. last_seen feeds the
        // stuck-loop window.
        let mut first_seen: HashMap<ElementIdentity, usize> = HashMap::new();
        let mut last_seen: HashMap<ElementIdentity, usize> = HashMap::new();
        let mut order: Vec<ElementIdentity> = Vec::new();

        for step in 1..=budget {
            self.session.press_key("Tab").await?;
            self.session
                .wait_for_timeout(self.config.settle_delay_ms)
                .await;

            let value = self
                .session
                .evaluate(self.config.identity_script.as_ref(), &[])
                .await?;
            let identity = ElementIdentity::from_value(value);

            if identity.is_anchor() {
                if step > expected + self.config.cycle_grace_steps {
                    debug!(step, "focus wrapped to anchor; cycle complete");
                    return Ok(TabTraversal {
                        steps: step,
                        order,
                        end: TraversalEnd::CycleComplete,
                    });
                }
                continue;
            }

            if let Some(&previous) = last_seen.get(&identity) {
                if step - previous < self.config.stuck_revisit_window
                    && first_seen.len() < self.config.stuck_ledger_limit
                {
                    debug!(step, %identity, "focus oscillating; stuck loop");
                    return Ok(TabTraversal {
                        steps: step,
                        order,
                        end: TraversalEnd::StuckLoop(identity),
                    });
                }
            }

            if !first_seen.contains_key(&identity) {
                first_seen.insert(identity.clone(), step);
                order.push(identity.clone());
            }
            last_seen.insert(identity, step);
        }

        Ok(TabTraversal {
            steps: budget,
            order,
            end: TraversalEnd::Exhausted,
        })
    }

    /// Whether keyboard traversal can make a full pass without getting
    /// stuck. A page with zero focusable elements passes vacuously: an
    /// empty check space cannot trap focus.
    pub async fn detect_trap(&self, expected: usize) -> SessionResult<CheckResult> {
        if expected == 0 {
            return Ok(CheckResult::pass(
                "no focusable elements; keyboard trap check passes vacuously",
            ));
        }
        let traversal = self.traverse(expected).await?;
        Ok(self.trap_verdict(&traversal, expected))
    }

    /// Trap verdict for an already-completed traversal. Lets callers answer
    /// the trap and coverage questions from one run of Tab presses.
    pub fn trap_verdict(&self, traversal: &TabTraversal, expected: usize) -> CheckResult {
        match &traversal.end {
            TraversalEnd::StuckLoop(identity) => CheckResult::fail(format!(
                "keyboard trap: focus oscillates around {identity} after {} steps \
                 ({} of {expected} elements reached)",
                traversal.steps,
                traversal.distinct_visited(),
            )),
            TraversalEnd::CycleComplete | TraversalEnd::Exhausted => CheckResult::pass(format!(
                "no keyboard trap: {} of {expected} elements reached in {} steps",
                traversal.distinct_visited(),
                traversal.steps,
            )),
        }
    }

    /// Coverage score for one traversal: distinct visited over expected.
    ///
    /// The pass threshold relaxes slightly on larger pages, tolerating a few
    /// elements reachable only after a prior hover or expand.
    pub async fn coverage(&self, expected: usize) -> SessionResult<CheckResult> {
        if expected == 0 {
            return Ok(CheckResult::pass(
                "no focusable elements; tab-order coverage passes vacuously",
            )
            .with_measured(1.0));
        }
        let traversal = self.traverse(expected).await?;
        Ok(self.coverage_verdict(&traversal, expected))
    }

    /// Coverage verdict for an already-completed traversal.
    pub fn coverage_verdict(&self, traversal: &TabTraversal, expected: usize) -> CheckResult {
        let score = traversal.distinct_visited() as f64 / expected as f64;
        let threshold = coverage_threshold(expected);
        let message = format!(
            "tab-order coverage {:.2} ({} of {expected} focusable elements) against threshold {threshold:.2}",
            score,
            traversal.distinct_visited(),
        );
        if score >= threshold {
            CheckResult::pass(message).with_measured(score)
        } else {
            CheckResult::fail(message).with_measured(score)
        }
    }
}

/// Pass threshold for coverage: `max(0.70, 0.80 - 0.01 * expected)`.
pub fn coverage_threshold(expected: usize) -> f64 {
    (0.80 - 0.01 * expected as f64).max(0.70)
}
