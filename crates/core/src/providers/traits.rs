use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::bar::Bar;
use crate::models::window::DateWindow;

/// Trait abstraction for daily price-series providers.
///
/// The calculator talks to one upstream bars API today, but everything
/// above this trait only sees `fetch_bars`. If the API stops working or
/// changes, we replace only that one implementation; tests substitute
/// mock providers the same way.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait BarProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch all daily bars for `symbol` inside the inclusive window.
    ///
    /// Returns bars sorted ascending by date, fully materialized: when the
    /// upstream API paginates, the provider follows every page before
    /// returning. An empty Vec means the upstream had no data for the
    /// window; callers decide whether that is an error.
    async fn fetch_bars(&self, symbol: &str, window: &DateWindow) -> Result<Vec<Bar>, CoreError>;
}
