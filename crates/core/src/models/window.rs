use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Inclusive calendar-date window for a price-series request.
///
/// Both bounds are calendar days; the provider widens them to
/// start-of-day / end-of-day instants when it builds the upstream query.
/// Constructors reject windows that reach past `today`, so a fetch is
/// never attempted for future data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day included in the window
    pub start: NaiveDate,

    /// Last day included in the window
    pub end: NaiveDate,
}

impl DateWindow {
    /// Validate an explicit `[start, end]` pair against `today`.
    pub fn new(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidWindow(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        if start > today {
            return Err(CoreError::InvalidWindow(format!(
                "start date {} is in the future (today is {})",
                start, today
            )));
        }
        if end > today {
            return Err(CoreError::InvalidWindow(format!(
                "end date {} is in the future (today is {})",
                end, today
            )));
        }
        Ok(Self { start, end })
    }

    /// Derive the window used by the historical-return view: one calendar
    /// month from `start`, clamped to `today` when the month runs past it.
    ///
    /// Calendar-month arithmetic clamps within the target month, so a
    /// window starting Jan 31 ends Feb 28 (or 29), never in March.
    pub fn from_start(start: NaiveDate, today: NaiveDate) -> Result<Self, CoreError> {
        if start > today {
            return Err(CoreError::InvalidWindow(format!(
                "start date {} is in the future (today is {})",
                start, today
            )));
        }
        let end = start
            .checked_add_months(Months::new(1))
            .unwrap_or(today)
            .min(today);
        Self::new(start, end, today)
    }

    /// Number of days the window spans, inclusive of both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
