use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// How often a recurring buy rule fires.
///
/// The selector data lives inside the variant, so a weekly rule always
/// carries a weekday and a monthly rule always carries a day-of-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "lowercase")]
pub enum Frequency {
    /// Fires on every bar in the series.
    Daily,

    /// Fires on bars whose weekday matches.
    Weekly { day_of_week: Weekday },

    /// Fires on bars whose day-of-month matches (1-31).
    ///
    /// Days 29-31 never fire in months that are too short; the purchase
    /// is skipped for that month rather than moved to the last day.
    Monthly { day_of_month: u32 },
}

impl Frequency {
    /// Whether a rule with this frequency buys on the given day.
    pub fn fires_on(&self, date: NaiveDate) -> bool {
        match self {
            Frequency::Daily => true,
            Frequency::Weekly { day_of_week } => date.weekday() == *day_of_week,
            Frequency::Monthly { day_of_month } => date.day() == *day_of_month,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly { day_of_week } => write!(f, "weekly on {}", day_of_week),
            Frequency::Monthly { day_of_month } => write!(f, "monthly on day {}", day_of_month),
        }
    }
}

/// A single recurring purchase rule in the buy plan.
///
/// Rules are independent: two identical rules both accrue on a matching
/// day. The id exists so a frontend can address rules in a list; it never
/// influences the valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyRule {
    /// Unique identifier
    pub id: Uuid,

    /// Fiat amount spent each time the rule fires (always positive)
    pub amount: f64,

    /// When the rule fires
    #[serde(flatten)]
    pub frequency: Frequency,
}

impl BuyRule {
    /// A rule that buys `amount` every day.
    pub fn daily(amount: f64) -> Result<Self, CoreError> {
        Self::build(amount, Frequency::Daily)
    }

    /// A rule that buys `amount` once a week on `day_of_week`.
    pub fn weekly(amount: f64, day_of_week: Weekday) -> Result<Self, CoreError> {
        Self::build(amount, Frequency::Weekly { day_of_week })
    }

    /// A rule that buys `amount` once a month on `day_of_month` (1-31).
    pub fn monthly(amount: f64, day_of_month: u32) -> Result<Self, CoreError> {
        Self::build(amount, Frequency::Monthly { day_of_month })
    }

    fn build(amount: f64, frequency: Frequency) -> Result<Self, CoreError> {
        let rule = Self {
            id: Uuid::new_v4(),
            amount,
            frequency,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Re-check the construction invariants.
    ///
    /// Constructors enforce these already; deserialized rules (e.g. from a
    /// frontend JSON payload) go through this before they are accepted.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CoreError::InvalidAmount(format!(
                "purchase amount must be a positive number, got {}",
                self.amount
            )));
        }
        if let Frequency::Monthly { day_of_month } = self.frequency {
            if !(1..=31).contains(&day_of_month) {
                return Err(CoreError::InvalidRule(format!(
                    "day of month must be between 1 and 31, got {}",
                    day_of_month
                )));
            }
        }
        Ok(())
    }

    /// Whether this rule buys on the given day.
    pub fn fires_on(&self, date: NaiveDate) -> bool {
        self.frequency.fires_on(date)
    }
}
