use thiserror::Error;

/// Unified error type for the entire btc-whatif-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Valuation preconditions ─────────────────────────────────────
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid buy rule: {0}")]
    InvalidRule(String),

    #[error("Purchase plan is empty: add at least one buy rule")]
    EmptyPlan,

    #[error("No purchases occurred: no buy rule fired on any day in the window")]
    NoPurchases,

    // ── Window validation ───────────────────────────────────────────
    #[error("Invalid date window: {0}")]
    InvalidWindow(String),

    // ── Plan management ─────────────────────────────────────────────
    #[error("Buy rule not found: {0}")]
    RuleNotFound(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No price data for {symbol} between {start} and {end}")]
    EmptySeries {
        symbol: String,
        start: String,
        end: String,
    },

    #[error("Malformed price series: {0}")]
    MalformedSeries(String),

    // ── Plan JSON hand-off ──────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Request lifecycle ───────────────────────────────────────────
    #[error("Calculation superseded by a newer request")]
    Superseded,
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // credential leakage. reqwest errors often contain full URLs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
