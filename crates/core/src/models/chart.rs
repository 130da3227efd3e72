use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One chart-ready row per bar in the requested window.
///
/// The core generates these, the frontend just renders them. Rows come
/// back in the same ascending order as the price series. The
/// historical-return view leaves the purchase accumulators at zero (it
/// simulates no purchases); the recurring view populates everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// Calendar day of the underlying bar
    pub date: NaiveDate,

    /// Close price on that day
    pub close: f64,

    /// Units held after this day's purchases (cumulative)
    pub units_held: f64,

    /// Fiat invested up to and including this day (cumulative)
    pub invested: f64,

    /// Total purchased on this day, 0 when no rule fired
    pub daily_purchase: f64,

    /// units_held * close - invested (cumulative)
    pub profit_loss: f64,

    /// Close price change vs the first bar's close, in percent
    pub return_pct: f64,
}
