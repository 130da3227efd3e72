use crate::errors::CoreError;
use crate::models::bar::Bar;
use crate::models::chart::DailyPoint;
use crate::models::plan::BuyRule;
use crate::models::valuation::{LumpSumResult, RecurringResult, RecurringValuation};

/// Prices hypothetical investment strategies over a daily bar series.
///
/// Pure business logic: no I/O, no clock, no randomness. Identical inputs
/// always produce identical outputs. The series is assumed already clipped
/// to the requested window, sorted ascending with positive closes (the
/// series service enforces this after every fetch); the engine does not
/// re-clip or re-sort.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Price a one-time purchase: buy `amount` at the first bar's close,
    /// hold, sell at the last bar's close.
    pub fn compute_lump_sum(
        &self,
        series: &[Bar],
        amount: f64,
    ) -> Result<LumpSumResult, CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::InvalidAmount(format!(
                "purchase amount must be a positive number, got {amount}"
            )));
        }
        if series.len() < 2 {
            return Err(CoreError::InsufficientData(format!(
                "lump-sum valuation needs at least two bars, got {}",
                series.len()
            )));
        }
        let first = &series[0];
        let last = &series[series.len() - 1];

        let units_acquired = amount / first.close;
        let final_value = units_acquired * last.close;
        let profit_loss = final_value - amount;
        Ok(LumpSumResult {
            initial_purchase: amount,
            buy_date: first.date,
            buy_price: first.close,
            units_acquired,
            sell_date: last.date,
            sell_price: last.close,
            final_value,
            profit_loss,
            percentage_profit: profit_loss / amount * 100.0,
        })
    }

    /// Map each bar to its close-price return relative to the first bar.
    ///
    /// Element-wise: output length equals input length, order is preserved,
    /// and the first row's return is 0 by construction. The purchase
    /// accumulators stay at zero, this view simulates no buying.
    pub fn compute_return_series(&self, series: &[Bar]) -> Result<Vec<DailyPoint>, CoreError> {
        let first = series.first().ok_or_else(|| {
            CoreError::InsufficientData("return series needs at least one bar".into())
        })?;
        let base = first.close;

        Ok(series
            .iter()
            .map(|bar| DailyPoint {
                date: bar.date,
                close: bar.close,
                units_held: 0.0,
                invested: 0.0,
                daily_purchase: 0.0,
                profit_loss: 0.0,
                return_pct: (bar.close - base) / base * 100.0,
            })
            .collect())
    }

    /// Simulate a recurring buy plan day by day over the series.
    ///
    /// A single forward pass in date order: every rule that fires on a
    /// bar's day buys at that day's close, and each emitted point carries
    /// the accumulators after that day's purchases. Each day depends on
    /// all prior days, so the fold is strictly sequential.
    pub fn compute_recurring(
        &self,
        series: &[Bar],
        plan: &[BuyRule],
    ) -> Result<RecurringValuation, CoreError> {
        if series.is_empty() {
            return Err(CoreError::InsufficientData(
                "recurring valuation needs at least one bar".into(),
            ));
        }
        if plan.is_empty() {
            return Err(CoreError::EmptyPlan);
        }
        for rule in plan {
            rule.validate()?;
        }

        let base = series[0].close;
        let mut units_held = 0.0_f64;
        let mut invested = 0.0_f64;
        let mut points = Vec::with_capacity(series.len());

        for bar in series {
            let mut daily_purchase = 0.0;
            for rule in plan {
                if rule.fires_on(bar.date) {
                    daily_purchase += rule.amount;
                    invested += rule.amount;
                    units_held += rule.amount / bar.close;
                }
            }
            points.push(DailyPoint {
                date: bar.date,
                close: bar.close,
                units_held,
                invested,
                daily_purchase,
                profit_loss: units_held * bar.close - invested,
                return_pct: (bar.close - base) / base * 100.0,
            });
        }

        // A plan that never fired has nothing to report; the percentage
        // would be a division by zero.
        if invested <= 0.0 {
            return Err(CoreError::NoPurchases);
        }

        let last_close = series[series.len() - 1].close;
        let final_value = units_held * last_close;
        let profit_loss = final_value - invested;
        Ok(RecurringValuation {
            result: RecurringResult {
                total_invested: invested,
                final_value,
                profit_loss,
                percentage_profit: profit_loss / invested * 100.0,
                total_units_acquired: units_held,
            },
            series: points,
        })
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
