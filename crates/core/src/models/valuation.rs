use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::chart::DailyPoint;

/// Outcome of a one-time purchase held to the end of the window.
///
/// Buys at the first bar's close, sells at the last bar's close. Created
/// fresh per calculation and replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumResult {
    /// Fiat amount spent on the buy date
    pub initial_purchase: f64,

    /// Day of the simulated purchase (first bar)
    pub buy_date: NaiveDate,

    /// Close price on the buy date
    pub buy_price: f64,

    /// Units acquired: initial_purchase / buy_price
    pub units_acquired: f64,

    /// Day of the simulated sale (last bar)
    pub sell_date: NaiveDate,

    /// Close price on the sell date
    pub sell_price: f64,

    /// Units held valued at the sell price
    pub final_value: f64,

    /// final_value - initial_purchase
    pub profit_loss: f64,

    /// profit_loss as a percentage of the initial purchase
    pub percentage_profit: f64,
}

/// Totals of a recurring-buy simulation over the full window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringResult {
    /// Sum of every purchase the plan made
    pub total_invested: f64,

    /// Accumulated units valued at the last bar's close
    pub final_value: f64,

    /// final_value - total_invested
    pub profit_loss: f64,

    /// profit_loss as a percentage of total_invested
    pub percentage_profit: f64,

    /// Units accumulated across all purchases
    pub total_units_acquired: f64,
}

/// Full output of a recurring-buy simulation: the totals plus one chart
/// row per bar in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringValuation {
    pub result: RecurringResult,
    pub series: Vec<DailyPoint>,
}
