use tracing::warn;

use crate::errors::CoreError;
use crate::models::bar::Bar;
use crate::models::window::DateWindow;
use crate::providers::traits::BarProvider;

/// The one symbol this calculator tracks.
pub const SYMBOL: &str = "BTC/USD";

/// Fetches and sanity-checks the daily price series the engine runs on.
///
/// Owns the provider; everything above this service works with plain
/// `Vec<Bar>` and never sees HTTP. A fetched series is rejected outright
/// when it breaks the bar invariant (non-empty, strictly ascending dates,
/// positive finite closes), since the engine's arithmetic builds on it.
pub struct SeriesService {
    provider: Box<dyn BarProvider>,
}

impl SeriesService {
    pub fn new(provider: Box<dyn BarProvider>) -> Self {
        Self { provider }
    }

    /// Name of the underlying provider (for logs/errors).
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch the daily bars for the tracked symbol inside the window.
    pub async fn fetch_series(&self, window: &DateWindow) -> Result<Vec<Bar>, CoreError> {
        let bars = self.provider.fetch_bars(SYMBOL, window).await?;
        if let Err(e) = Self::check_series(&bars, window) {
            warn!(
                provider = self.provider.name(),
                %window,
                error = %e,
                "rejected fetched series"
            );
            return Err(e);
        }
        Ok(bars)
    }

    /// Enforce the series invariant on freshly fetched bars.
    fn check_series(bars: &[Bar], window: &DateWindow) -> Result<(), CoreError> {
        if bars.is_empty() {
            return Err(CoreError::EmptySeries {
                symbol: SYMBOL.to_string(),
                start: window.start.to_string(),
                end: window.end.to_string(),
            });
        }
        let mut prev: Option<&Bar> = None;
        for bar in bars {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(CoreError::MalformedSeries(format!(
                    "close {} on {} is not a positive number",
                    bar.close, bar.date
                )));
            }
            if let Some(prev) = prev {
                if bar.date <= prev.date {
                    return Err(CoreError::MalformedSeries(format!(
                        "bars out of order: {} follows {}",
                        bar.date, prev.date
                    )));
                }
            }
            prev = Some(bar);
        }
        Ok(())
    }
}
