use super::{
    avg_body, ensure_len, is_doji, is_short_body, PatternDetector, PatternError, BEAR, BULL,
    DOMINANT_WICK_RATIO, LONG_WICK_RATIO, MARUBOZU_BODY_RATIO, TINY_WICK_RATIO,
};
use crate::types::Candle;

/// Body no larger than a tenth of the trailing average body.
pub struct Doji;

impl PatternDetector for Doji {
    fn name(&self) -> &'static str {
        "doji"
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for (i, c) in candles.iter().enumerate() {
            if is_doji(c, avg_body(candles, i)) {
                out[i] = BULL;
            }
        }
        Ok(out)
    }
}

/// Doji whose range hangs almost entirely below the body.
pub struct DragonflyDoji;

impl PatternDetector for DragonflyDoji {
    fn name(&self) -> &'static str {
        "dragonfly_doji"
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for (i, c) in candles.iter().enumerate() {
            let range = c.range();
            if range <= f64::EPSILON {
                continue;
            }
            if is_doji(c, avg_body(candles, i))
                && c.upper_wick() <= TINY_WICK_RATIO * range
                && c.lower_wick() >= DOMINANT_WICK_RATIO * range
            {
                out[i] = BULL;
            }
        }
        Ok(out)
    }
}

pub struct GravestoneDoji;

impl PatternDetector for GravestoneDoji {
    fn name(&self) -> &'static str {
        "gravestone_doji"
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for (i, c) in candles.iter().enumerate() {
            let range = c.range();
            if range <= f64::EPSILON {
                continue;
            }
            if is_doji(c, avg_body(candles, i))
                && c.lower_wick() <= TINY_WICK_RATIO * range
                && c.upper_wick() >= DOMINANT_WICK_RATIO * range
            {
                out[i] = BEAR;
            }
        }
        Ok(out)
    }
}

/// Small body near the top of the range with a lower wick at least twice the
/// body.
pub struct Hammer;

impl PatternDetector for Hammer {
    fn name(&self) -> &'static str {
        "hammer"
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 0..candles.len() {
            if hammer_shape(candles, i) {
                out[i] = BULL;
            }
        }
        Ok(out)
    }
}

pub struct InvertedHammer;

impl PatternDetector for InvertedHammer {
    fn name(&self) -> &'static str {
        "inverted_hammer"
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 0..candles.len() {
            if inverted_hammer_shape(candles, i) {
                out[i] = BULL;
            }
        }
        Ok(out)
    }
}

/// Hammer shape printed above the midpoint of a preceding bullish body.
pub struct HangingMan;

impl PatternDetector for HangingMan {
    fn name(&self) -> &'static str {
        "hanging_man"
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 1..candles.len() {
            let prev = &candles[i - 1];
            if hammer_shape(candles, i)
                && prev.is_bullish()
                && candles[i].body_bottom() >= prev.body_mid()
            {
                out[i] = BEAR;
            }
        }
        Ok(out)
    }
}

/// Inverted hammer shape gapping clear above the previous body.
pub struct ShootingStar;

impl PatternDetector for ShootingStar {
    fn name(&self) -> &'static str {
        "shooting_star"
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 1..candles.len() {
            let prev = &candles[i - 1];
            if inverted_hammer_shape(candles, i) && candles[i].body_bottom() >= prev.body_top() {
                out[i] = BEAR;
            }
        }
        Ok(out)
    }
}

/// Body filling nearly the whole range; direction follows the candle color.
pub struct Marubozu;

impl PatternDetector for Marubozu {
    fn name(&self) -> &'static str {
        "marubozu"
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for (i, c) in candles.iter().enumerate() {
            let range = c.range();
            if range <= f64::EPSILON {
                continue;
            }
            if c.body() >= MARUBOZU_BODY_RATIO * range {
                if c.is_bullish() {
                    out[i] = BULL;
                } else if c.is_bearish() {
                    out[i] = BEAR;
                }
            }
        }
        Ok(out)
    }
}

/// Small body with wicks longer than the body on both sides.
pub struct SpinningTop;

impl PatternDetector for SpinningTop {
    fn name(&self) -> &'static str {
        "spinning_top"
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for (i, c) in candles.iter().enumerate() {
            if c.range() <= f64::EPSILON {
                continue;
            }
            let avg = avg_body(candles, i);
            let body = c.body();
            if !is_doji(c, avg)
                && is_short_body(c, avg)
                && c.upper_wick() > body
                && c.lower_wick() > body
            {
                if c.is_bullish() {
                    out[i] = BULL;
                } else if c.is_bearish() {
                    out[i] = BEAR;
                }
            }
        }
        Ok(out)
    }
}

fn hammer_shape(candles: &[Candle], i: usize) -> bool {
    let c = &candles[i];
    let range = c.range();
    if range <= f64::EPSILON {
        return false;
    }
    let avg = avg_body(candles, i);
    !is_doji(c, avg)
        && is_short_body(c, avg)
        && c.lower_wick() >= LONG_WICK_RATIO * c.body()
        && c.upper_wick() <= TINY_WICK_RATIO * range
}

fn inverted_hammer_shape(candles: &[Candle], i: usize) -> bool {
    let c = &candles[i];
    let range = c.range();
    if range <= f64::EPSILON {
        return false;
    }
    let avg = avg_body(candles, i);
    !is_doji(c, avg)
        && is_short_body(c, avg)
        && c.upper_wick() >= LONG_WICK_RATIO * c.body()
        && c.lower_wick() <= TINY_WICK_RATIO * range
}
