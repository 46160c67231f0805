use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::patterns::PatternError;

/// Direction carried by a nonzero detector value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Bullish,
    Bearish,
}

impl SignalType {
    /// Sign convention: positive detector values are bullish, negative bearish.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            v if v > 0 => Some(SignalType::Bullish),
            v if v < 0 => Some(SignalType::Bearish),
            _ => None,
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SignalType::Bullish => "bullish",
            SignalType::Bearish => "bearish",
        })
    }
}

/// Age of the most recent detection, in the caller's chosen units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recency {
    Candles(u32),
    Minutes(i64),
}

impl Recency {
    pub fn within(&self, max_age: u32) -> bool {
        match *self {
            Recency::Candles(n) => n <= max_age,
            Recency::Minutes(m) => m <= max_age as i64,
        }
    }
}

impl std::fmt::Display for Recency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Recency::Candles(n) => write!(f, "{} candles ago", n),
            Recency::Minutes(m) => write!(f, "{} min ago", m),
        }
    }
}

/// A fresh detection inside one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalHit {
    pub signal_type: SignalType,
    pub recency: Recency,
    /// Position of the detection candle within the series.
    pub index: usize,
    /// Open time of the detection candle.
    pub detected_at: DateTime<Utc>,
}

/// What one detector did with one series. The sweep collapses `NoSignal` and
/// `Failed` to "nothing reported", but callers that care can tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorOutcome {
    Found(SignalHit),
    NoSignal,
    Failed(PatternError),
}

impl DetectorOutcome {
    pub fn into_option(self) -> Option<SignalHit> {
        match self {
            DetectorOutcome::Found(hit) => Some(hit),
            _ => None,
        }
    }
}

/// One reported (symbol, pattern) detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub symbol: String,
    pub pattern: String,
    pub signal_type: SignalType,
    pub recency: Recency,
    pub detected_at: DateTime<Utc>,
}
