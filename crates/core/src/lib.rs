pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use models::{
    chart::DailyPoint,
    plan::BuyRule,
    valuation::{LumpSumResult, RecurringValuation},
    window::DateWindow,
};
use providers::alpaca::AlpacaProvider;
use providers::traits::BarProvider;
use services::{series_service::SeriesService, valuation_service::ValuationService};
use tracing::debug;

use errors::CoreError;

/// Maximum simulation window in days (10 years).
/// Bounds the provider's pagination loop against runaway requests.
const MAX_WINDOW_DAYS: i64 = 3650;

/// Latest-wins holder for one view's displayed result.
///
/// Every calculation claims a ticket before its fetch; once the slow part
/// is done, only the ticket that is still the newest may publish. A stale
/// response can therefore never overwrite the result of a calculation
/// issued after it.
struct ResultSlot<T> {
    latest: AtomicU64,
    value: Mutex<Option<T>>,
}

impl<T: Clone> ResultSlot<T> {
    fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            value: Mutex::new(None),
        }
    }

    /// Claim a ticket for a new calculation, superseding all prior ones.
    fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a finished calculation, unless a newer ticket was issued.
    fn publish(&self, ticket: u64, value: T) -> Result<T, CoreError> {
        let mut slot = self.value.lock().unwrap_or_else(|e| e.into_inner());
        let latest = self.latest.load(Ordering::SeqCst);
        if latest != ticket {
            debug!(ticket, latest, "discarding superseded calculation");
            return Err(CoreError::Superseded);
        }
        *slot = Some(value.clone());
        Ok(value)
    }

    /// The most recently published value, if any.
    fn current(&self) -> Option<T> {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn clear(&self) {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Main entry point for the BTC What-If core library.
/// Holds the buy plan, the services, and each view's latest result.
#[must_use]
pub struct WhatIfCalculator {
    series_service: SeriesService,
    valuation_service: ValuationService,
    /// Working buy plan for the recurring view, edited by the frontend.
    plan: Mutex<Vec<BuyRule>>,
    lump_sum: ResultSlot<LumpSumResult>,
    recurring: ResultSlot<RecurringValuation>,
    return_series: ResultSlot<Vec<DailyPoint>>,
}

impl std::fmt::Debug for WhatIfCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rules = self.plan.lock().unwrap_or_else(|e| e.into_inner()).len();
        f.debug_struct("WhatIfCalculator")
            .field("provider", &self.series_service.provider_name())
            .field("rules", &rules)
            .field("lump_sum", &self.lump_sum.current().is_some())
            .field("recurring", &self.recurring.current().is_some())
            .field("return_series", &self.return_series.current().is_some())
            .finish()
    }
}

impl WhatIfCalculator {
    /// Create a calculator backed by the Alpaca crypto bars API.
    pub fn new() -> Self {
        Self::with_provider(Box::new(AlpacaProvider::new()))
    }

    /// Create a calculator with a custom bar provider (e.g. for tests).
    pub fn with_provider(provider: Box<dyn BarProvider>) -> Self {
        Self {
            series_service: SeriesService::new(provider),
            valuation_service: ValuationService::new(),
            plan: Mutex::new(Vec::new()),
            lump_sum: ResultSlot::new(),
            recurring: ResultSlot::new(),
            return_series: ResultSlot::new(),
        }
    }

    // ── Simulations ─────────────────────────────────────────────────

    /// Simulate a one-time purchase of `amount` at the start of the
    /// window, sold at its end.
    ///
    /// Everything checkable up front is validated before any fetch. The
    /// published result replaces the previous lump-sum result unless a
    /// newer calculation was issued while this one was in flight.
    pub async fn simulate_lump_sum(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        amount: f64,
    ) -> Result<LumpSumResult, CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::InvalidAmount(format!(
                "purchase amount must be a positive number, got {amount}"
            )));
        }
        let window = Self::checked_window(start, end)?;

        let ticket = self.lump_sum.issue();
        let series = self.series_service.fetch_series(&window).await?;
        let outcome = self.valuation_service.compute_lump_sum(&series, amount)?;
        self.lump_sum.publish(ticket, outcome)
    }

    /// Load the historical return view: price returns relative to `start`,
    /// over a window ending one calendar month later (clamped to today).
    pub async fn load_return_series(
        &self,
        start: NaiveDate,
    ) -> Result<Vec<DailyPoint>, CoreError> {
        let today = chrono::Utc::now().date_naive();
        let window = DateWindow::from_start(start, today)?;

        let ticket = self.return_series.issue();
        let series = self.series_service.fetch_series(&window).await?;
        let points = self.valuation_service.compute_return_series(&series)?;
        self.return_series.publish(ticket, points)
    }

    /// Simulate the stored buy plan over the window.
    ///
    /// The plan is snapshotted up front, so rule edits made while the
    /// fetch is in flight do not affect this calculation.
    pub async fn simulate_recurring(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RecurringValuation, CoreError> {
        let plan = self.rules();
        if plan.is_empty() {
            return Err(CoreError::EmptyPlan);
        }
        let window = Self::checked_window(start, end)?;

        let ticket = self.recurring.issue();
        let series = self.series_service.fetch_series(&window).await?;
        let outcome = self.valuation_service.compute_recurring(&series, &plan)?;
        self.recurring.publish(ticket, outcome)
    }

    // ── Buy Plan Management ─────────────────────────────────────────

    /// Add a rule to the buy plan. Returns its id.
    pub fn add_rule(&self, rule: BuyRule) -> Result<uuid::Uuid, CoreError> {
        rule.validate()?;
        let id = rule.id;
        self.plan
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(rule);
        Ok(id)
    }

    /// Replace an existing rule (matched by id) with `rule`.
    pub fn update_rule(&self, rule: BuyRule) -> Result<(), CoreError> {
        rule.validate()?;
        let mut plan = self.plan.lock().unwrap_or_else(|e| e.into_inner());
        let slot = plan
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| CoreError::RuleNotFound(rule.id.to_string()))?;
        *slot = rule;
        Ok(())
    }

    /// Remove a rule by its id.
    pub fn remove_rule(&self, id: uuid::Uuid) -> Result<(), CoreError> {
        let mut plan = self.plan.lock().unwrap_or_else(|e| e.into_inner());
        let idx = plan
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoreError::RuleNotFound(id.to_string()))?;
        plan.remove(idx);
        Ok(())
    }

    /// Snapshot of the current buy plan, in insertion order.
    #[must_use]
    pub fn rules(&self) -> Vec<BuyRule> {
        self.plan.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of rules in the buy plan.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.plan.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Remove every rule from the plan.
    pub fn clear_rules(&self) {
        self.plan.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the buy plan as a JSON string.
    pub fn export_rules_to_json(&self) -> Result<String, CoreError> {
        let plan = self.rules();
        serde_json::to_string_pretty(&plan)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize buy plan: {e}")))
    }

    /// Import buy rules from a JSON string, appending them to the plan.
    /// Every rule is validated first; if any fails, none are added.
    /// Returns the number of rules imported.
    pub fn import_rules_from_json(&self, json: &str) -> Result<usize, CoreError> {
        let rules: Vec<BuyRule> = serde_json::from_str(json)?;
        for rule in &rules {
            rule.validate()?;
        }
        let count = rules.len();
        self.plan
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(rules);
        Ok(count)
    }

    // ── Current Results ─────────────────────────────────────────────

    /// The most recently published lump-sum result, if any.
    #[must_use]
    pub fn current_lump_sum(&self) -> Option<LumpSumResult> {
        self.lump_sum.current()
    }

    /// The most recently published recurring valuation, if any.
    #[must_use]
    pub fn current_recurring(&self) -> Option<RecurringValuation> {
        self.recurring.current()
    }

    /// The most recently published historical return series, if any.
    #[must_use]
    pub fn current_return_series(&self) -> Option<Vec<DailyPoint>> {
        self.return_series.current()
    }

    /// Drop all published results (e.g. when the frontend resets).
    pub fn clear_results(&self) {
        self.lump_sum.clear();
        self.recurring.clear();
        self.return_series.clear();
    }

    /// Name of the underlying price provider.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.series_service.provider_name()
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Validate an explicit window against today and the range cap.
    fn checked_window(start: NaiveDate, end: NaiveDate) -> Result<DateWindow, CoreError> {
        let today = chrono::Utc::now().date_naive();
        let window = DateWindow::new(start, end, today)?;
        if window.days() > MAX_WINDOW_DAYS {
            return Err(CoreError::InvalidWindow(format!(
                "window of {} days exceeds maximum of {MAX_WINDOW_DAYS} days (10 years)",
                window.days()
            )));
        }
        Ok(window)
    }
}

impl Default for WhatIfCalculator {
    fn default() -> Self {
        Self::new()
    }
}
