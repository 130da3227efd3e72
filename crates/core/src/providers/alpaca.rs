use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use super::traits::BarProvider;
use crate::errors::CoreError;
use crate::models::bar::Bar;
use crate::models::window::DateWindow;

const BASE_URL: &str = "https://data.alpaca.markets/v1beta3/crypto/us/bars";

/// Upstream page size cap; longer windows paginate via `next_page_token`.
const PAGE_LIMIT: u32 = 1000;

/// Alpaca Market Data provider for cryptocurrency daily bars.
///
/// - **Free**: the US crypto bars endpoint requires no API key.
/// - **Data**: daily OHLCV plus vwap, RFC 3339 bar timestamps.
/// - **Endpoint**: `/v1beta3/crypto/us/bars` with symbols like "BTC/USD".
pub struct AlpacaProvider {
    client: Client,
}

impl AlpacaProvider {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    /// Decode one page of the bars payload.
    ///
    /// Returns the page's bars for `symbol` (empty when the symbol key is
    /// absent) and the continuation token. Public so payload decoding is
    /// testable without network access.
    pub fn parse_page(body: &str, symbol: &str) -> Result<(Vec<Bar>, Option<String>), CoreError> {
        let resp: BarsResponse = serde_json::from_str(body)
            .map_err(|e| CoreError::MalformedSeries(format!("undecodable bars payload: {e}")))?;

        let mut bars = Vec::new();
        if let Some(page) = resp.bars.get(symbol) {
            bars.reserve(page.len());
            for raw in page {
                // Daily bars carry a full timestamp; the calendar day is
                // taken from the UTC instant.
                let ts = DateTime::parse_from_rfc3339(&raw.timestamp).map_err(|e| {
                    CoreError::MalformedSeries(format!(
                        "invalid bar timestamp {:?}: {e}",
                        raw.timestamp
                    ))
                })?;
                bars.push(Bar::with_volume(
                    ts.with_timezone(&Utc).date_naive(),
                    raw.open,
                    raw.high,
                    raw.low,
                    raw.close,
                    raw.volume,
                    raw.vwap,
                ));
            }
        }
        Ok((bars, resp.next_page_token))
    }
}

impl Default for AlpacaProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Alpaca API response types ───────────────────────────────────────

#[derive(Deserialize)]
struct BarsResponse {
    /// Symbol → bars for that symbol. Empty (or missing) when the window
    /// holds no data.
    #[serde(default)]
    bars: HashMap<String, Vec<RawBar>>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct RawBar {
    #[serde(rename = "t")]
    timestamp: String,
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "v")]
    volume: f64,
    #[serde(rename = "vw")]
    vwap: f64,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl BarProvider for AlpacaProvider {
    fn name(&self) -> &str {
        "Alpaca"
    }

    async fn fetch_bars(&self, symbol: &str, window: &DateWindow) -> Result<Vec<Bar>, CoreError> {
        // Widen the calendar window to full-day UTC instants.
        let start = window.start.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = window.end.and_hms_opt(23, 59, 59).unwrap().and_utc();
        let start_param = start.to_rfc3339();
        let end_param = end.to_rfc3339();
        let limit_param = PAGE_LIMIT.to_string();

        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let mut request = self.client.get(BASE_URL).query(&[
                ("symbols", symbol),
                ("timeframe", "1D"),
                ("start", start_param.as_str()),
                ("end", end_param.as_str()),
                ("limit", limit_param.as_str()),
                ("sort", "asc"),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("page_token", token.as_str())]);
            }

            let response = request.header("accept", "application/json").send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                let snippet: String = body.chars().take(200).collect();
                return Err(CoreError::Api {
                    provider: "Alpaca".into(),
                    message: format!("HTTP {status} fetching bars for {symbol}: {snippet}"),
                });
            }

            let (page, next) = Self::parse_page(&body, symbol)?;
            bars.extend(page);
            pages += 1;

            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(provider = "Alpaca", %window, pages, bars = bars.len(), "fetched daily bars");
        Ok(bars)
    }
}
