//! Web-vitals collection: LCP, FID, CLS.
//!
//! One page-context script registers the three performance observers and
//! resolves with whatever it has when the shared time budget runs out.
//! Freshness is sacrificed for liveness: the collector never hangs waiting
//! for a paint or input that will not come.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::session::{BrowserSession, SessionResult};

/// Default shared budget for the LCP/FID observers, in milliseconds.
pub const DEFAULT_BUDGET_MS: u64 = 1000;

/// Metrics for the current page. `None` means the corresponding entry never
/// fired within the budget; CLS is always computed from whatever
/// layout-shift entries were buffered at resolution time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    /// Largest Contentful Paint, ms from navigation start.
    pub lcp_ms: Option<f64>,
    /// First Input Delay, ms.
    pub fid_ms: Option<f64>,
    /// Cumulative Layout Shift score (sum of shifts without recent input).
    pub cls: f64,
}

/// Self-contained page script: `(budgetMs) => Promise<PageMetrics>`.
///
/// Takes its budget as an explicit argument and touches nothing outside page
/// context. Resolves early once both LCP and FID have fired, otherwise on
/// the budget timer with partial results.
pub const METRICS_SCRIPT: &str = r#"(budgetMs) => new Promise((resolve) => {
    const metrics = { lcp_ms: null, fid_ms: null, cls: 0 };
    let settled = false;
    const finish = () => {
        if (settled) return;
        settled = true;
        resolve(metrics);
    };
    const maybeFinish = () => {
        if (metrics.lcp_ms !== null && metrics.fid_ms !== null) finish();
    };
    try {
        new PerformanceObserver((list) => {
            const entries = list.getEntries();
            if (entries.length > 0) {
                metrics.lcp_ms = entries[entries.length - 1].startTime;
                maybeFinish();
            }
        }).observe({ type: 'largest-contentful-paint', buffered: true });
        new PerformanceObserver((list) => {
            const entry = list.getEntries()[0];
            if (entry) {
                metrics.fid_ms = entry.processingStart - entry.startTime;
                maybeFinish();
            }
        }).observe({ type: 'first-input', buffered: true });
        new PerformanceObserver((list) => {
            for (const entry of list.getEntries()) {
                if (!entry.hadRecentInput) metrics.cls += entry.value;
            }
        }).observe({ type: 'layout-shift', buffered: true });
    } catch (e) {
        finish();
        return;
    }
    setTimeout(finish, budgetMs);
})"#;

/// Collects web-vitals through the session.
pub struct MetricsCollector<'a> {
    session: &'a dyn BrowserSession,
    budget_ms: u64,
}

impl<'a> MetricsCollector<'a> {
    pub fn new(session: &'a dyn BrowserSession) -> Self {
        Self {
            session,
            budget_ms: DEFAULT_BUDGET_MS,
        }
    }

    /// Override the shared observer budget.
    pub fn with_budget_ms(mut self, budget_ms: u64) -> Self {
        self.budget_ms = budget_ms;
        self
    }

    /// Collect current metrics, resolving with partial results at the
    /// budget boundary rather than hanging.
    pub async fn collect(&self) -> SessionResult<PageMetrics> {
        let value = self
            .session
            .evaluate(METRICS_SCRIPT, &[json!(self.budget_ms)])
            .await?;
        let metrics: PageMetrics = serde_json::from_value(value).unwrap_or_else(|err| {
            debug!(%err, "metrics payload did not deserialize; reporting empty metrics");
            PageMetrics::default()
        });
        Ok(metrics)
    }
}
