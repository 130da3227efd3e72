use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One aggregated trading day for the tracked symbol.
///
/// Bars arrive from the provider already sorted ascending by date, one bar
/// per calendar day (UTC). The valuation engine only reads `close`; the
/// remaining fields ride along for chart tooltips and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Calendar day of the bar (UTC)
    pub date: NaiveDate,

    /// Opening price
    pub open: f64,

    /// Daily high
    pub high: f64,

    /// Daily low
    pub low: f64,

    /// Closing price (the engine's buy/sell price for this day)
    pub close: f64,

    /// Traded volume over the day
    pub volume: f64,

    /// Volume-weighted average price
    pub vwap: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume: 0.0,
            vwap: 0.0,
        }
    }

    /// Create a bar with volume and vwap attached.
    pub fn with_volume(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        vwap: f64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            vwap,
        }
    }
}
