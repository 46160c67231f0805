use lazy_static::lazy_static;
use thiserror::Error;

use crate::types::Candle;

mod double;
mod single;
mod triple;

pub use double::{DarkCloudCover, Engulfing, Harami, Piercing};
pub use single::{
    Doji, DragonflyDoji, GravestoneDoji, Hammer, HangingMan, InvertedHammer, Marubozu,
    ShootingStar, SpinningTop,
};
pub use triple::{EveningStar, MorningStar, ThreeBlackCrows, ThreeWhiteSoldiers};

/// Bullish marker value, one per matched candle.
pub const BULL: i32 = 100;
/// Bearish marker value.
pub const BEAR: i32 = -100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("need {need} candles, got {got}")]
    InsufficientData { need: usize, got: usize },
    #[error("detector returned {got} values for {expected} candles")]
    OutputLengthMismatch { expected: usize, got: usize },
    #[error("{0}")]
    Internal(&'static str),
}

/// A named candlestick shape evaluated over an oldest-first series.
///
/// `detect` returns one signed value per input candle: zero for no match,
/// positive for bullish, negative for bearish. A multi-candle shape marks the
/// index of its final candle.
pub trait PatternDetector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fewest candles the shape is defined over.
    fn min_candles(&self) -> usize;

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError>;
}

lazy_static! {
    static ref REGISTRY: Vec<Box<dyn PatternDetector>> = vec![
        Box::new(Doji),
        Box::new(DragonflyDoji),
        Box::new(GravestoneDoji),
        Box::new(Hammer),
        Box::new(InvertedHammer),
        Box::new(HangingMan),
        Box::new(ShootingStar),
        Box::new(Marubozu),
        Box::new(SpinningTop),
        Box::new(Engulfing),
        Box::new(Harami),
        Box::new(Piercing),
        Box::new(DarkCloudCover),
        Box::new(MorningStar),
        Box::new(EveningStar),
        Box::new(ThreeWhiteSoldiers),
        Box::new(ThreeBlackCrows),
    ];
}

/// Looks a detector up by its registered name.
pub fn detector(name: &str) -> Option<&'static dyn PatternDetector> {
    REGISTRY.iter().find(|d| d.name() == name).map(|d| d.as_ref())
}

pub fn all_detectors() -> impl Iterator<Item = &'static dyn PatternDetector> {
    REGISTRY.iter().map(|d| d.as_ref())
}

/// Every registered pattern name, in registry order.
pub fn pattern_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|d| d.name()).collect()
}

// Shape thresholds, shared across detectors.
pub(crate) const BODY_AVG_PERIOD: usize = 10;
pub(crate) const DOJI_BODY_FACTOR: f64 = 0.1;
pub(crate) const LONG_WICK_RATIO: f64 = 2.0;
pub(crate) const TINY_WICK_RATIO: f64 = 0.1;
pub(crate) const DOMINANT_WICK_RATIO: f64 = 0.6;
pub(crate) const MARUBOZU_BODY_RATIO: f64 = 0.95;
pub(crate) const SOLDIER_WICK_RATIO: f64 = 0.2;

pub(crate) fn ensure_len(candles: &[Candle], need: usize) -> Result<(), PatternError> {
    if candles.len() < need {
        return Err(PatternError::InsufficientData {
            need,
            got: candles.len(),
        });
    }
    Ok(())
}

/// Mean body over up to `BODY_AVG_PERIOD` candles before `idx`, the candle at
/// `idx` excluded. Falls back to the candle's own body at index zero.
pub(crate) fn avg_body(candles: &[Candle], idx: usize) -> f64 {
    if idx == 0 {
        return candles[0].body();
    }
    let start = idx.saturating_sub(BODY_AVG_PERIOD);
    let window = &candles[start..idx];
    window.iter().map(Candle::body).sum::<f64>() / window.len() as f64
}

pub(crate) fn is_doji(c: &Candle, avg: f64) -> bool {
    c.body() <= avg * DOJI_BODY_FACTOR
}

pub(crate) fn is_long_body(c: &Candle, avg: f64) -> bool {
    c.body() > avg
}

pub(crate) fn is_short_body(c: &Candle, avg: f64) -> bool {
    c.body() < avg
}
