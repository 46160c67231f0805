use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::types::{Candle, CandleSeries, Timeframe};

pub const DEFAULT_BASE_URL: &str = "https://www.okx.com";
/// Per-request timeout; a stuck fetch must not stall the whole sweep.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Symbol listings may be served from cache for up to an hour.
const SYMBOL_CACHE_TTL: Duration = Duration::from_secs(3600);
/// Pause enforced between consecutive requests.
const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);

/// Supplies the tradeable universe and candle series for it.
///
/// Implementations fail soft: a broken upstream yields an empty list or an
/// empty series, never an error the sweep would have to handle.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn list_symbols(&self) -> Vec<String>;

    async fn get_candles(&self, symbol: &str, timeframe: Timeframe, limit: u32) -> CandleSeries;
}

#[derive(Debug, Clone)]
pub struct OkxConfig {
    pub base_url: String,
    pub throttle: Duration,
}

impl Default for OkxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            throttle: DEFAULT_THROTTLE,
        }
    }
}

impl OkxConfig {
    /// Reads OKX_BASE_URL and OKX_THROTTLE_MS, keeping defaults where unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("OKX_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(ms) = std::env::var("OKX_THROTTLE_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                config.throttle = Duration::from_millis(ms);
            }
        }
        config
    }
}

#[derive(Debug, Error)]
enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("OKX code {code}: {msg}")]
    Api { code: String, msg: String },
}

#[derive(Deserialize)]
struct InstrumentsEnvelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Instrument>,
}

#[derive(Deserialize)]
struct Instrument {
    #[serde(rename = "instId")]
    inst_id: String,
    #[serde(default)]
    state: String,
}

#[derive(Deserialize)]
struct CandlesEnvelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Vec<String>>,
}

struct SymbolCache {
    fetched_at: Instant,
    symbols: Vec<String>,
}

/// Read-only client for the OKX v5 public market API.
pub struct OkxClient {
    http: Client,
    base_url: String,
    throttle: Duration,
    last_request: Mutex<Option<Instant>>,
    symbols: RwLock<Option<SymbolCache>>,
}

impl OkxClient {
    pub fn new(config: OkxConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: config.base_url,
            throttle: config.throttle,
            last_request: Mutex::new(None),
            symbols: RwLock::new(None),
        })
    }

    /// Spaces consecutive requests by the courtesy interval.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let since = prev.elapsed();
            if since < self.throttle {
                tokio::time::sleep(self.throttle - since).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn fetch_instruments(&self) -> Result<Vec<String>, FetchError> {
        self.pace().await;
        let url = format!(
            "{}/api/v5/public/instruments?instType=SPOT",
            self.base_url
        );
        let envelope: InstrumentsEnvelope = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if envelope.code != "0" {
            return Err(FetchError::Api {
                code: envelope.code,
                msg: envelope.msg,
            });
        }
        Ok(envelope
            .data
            .into_iter()
            .filter(|inst| inst.state.is_empty() || inst.state == "live")
            .map(|inst| inst.inst_id)
            .collect())
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<CandleSeries, FetchError> {
        self.pace().await;
        let url = format!(
            "{}/api/v5/market/candles?instId={}&bar={}&limit={}",
            self.base_url,
            symbol,
            timeframe.okx_bar(),
            limit
        );
        let envelope: CandlesEnvelope = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if envelope.code != "0" {
            return Err(FetchError::Api {
                code: envelope.code,
                msg: envelope.msg,
            });
        }
        Ok(parse_candle_rows(&envelope.data))
    }
}

#[async_trait]
impl MarketDataSource for OkxClient {
    async fn list_symbols(&self) -> Vec<String> {
        {
            let cache = self.symbols.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < SYMBOL_CACHE_TTL {
                    debug!("[OKX] Serving {} symbols from cache", cached.symbols.len());
                    return cached.symbols.clone();
                }
            }
        }
        match self.fetch_instruments().await {
            Ok(symbols) => {
                info!("[OKX] Listed {} live spot instruments", symbols.len());
                let mut cache = self.symbols.write().await;
                *cache = Some(SymbolCache {
                    fetched_at: Instant::now(),
                    symbols: symbols.clone(),
                });
                symbols
            }
            Err(e) => {
                warn!("[OKX] Failed to list instruments: {}", e);
                // Fall back to the stale list when the refresh fails.
                let cache = self.symbols.read().await;
                cache
                    .as_ref()
                    .map(|cached| cached.symbols.clone())
                    .unwrap_or_default()
            }
        }
    }

    async fn get_candles(&self, symbol: &str, timeframe: Timeframe, limit: u32) -> CandleSeries {
        match self.fetch_candles(symbol, timeframe, limit).await {
            Ok(series) => series,
            Err(e) => {
                warn!("[OKX] Failed to fetch candles for {}: {}", symbol, e);
                CandleSeries::empty()
            }
        }
    }
}

/// Converts OKX candle rows (newest first on the wire) into a validated
/// oldest-first series. Any malformed row degrades the whole payload to an
/// empty series.
pub fn parse_candle_rows(rows: &[Vec<String>]) -> CandleSeries {
    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(candle) = parse_candle_row(row) else {
            warn!("[OKX] Malformed candle row: {:?}", row);
            return CandleSeries::empty();
        };
        candles.push(candle);
    }
    candles.sort_by_key(|c| c.ts);
    match CandleSeries::new(candles) {
        Ok(series) => series,
        Err(e) => {
            warn!("[OKX] Rejected candle payload: {}", e);
            CandleSeries::empty()
        }
    }
}

fn parse_candle_row(row: &[String]) -> Option<Candle> {
    // [ts, open, high, low, close, volume, ...]; trailing fields ignored.
    if row.len() < 6 {
        return None;
    }
    let ts_ms: i64 = row[0].parse().ok()?;
    let ts = Utc.timestamp_millis_opt(ts_ms).single()?;
    Some(Candle {
        ts,
        open: row[1].parse().ok()?,
        high: row[2].parse().ok()?,
        low: row[3].parse().ok()?,
        close: row[4].parse().ok()?,
        volume: row[5].parse().ok()?,
    })
}
