use super::{
    avg_body, ensure_len, is_long_body, is_short_body, PatternDetector, PatternError, BEAR, BULL,
};
use crate::types::Candle;

/// Body strictly wrapping the previous candle's body, in the opposite color.
pub struct Engulfing;

impl PatternDetector for Engulfing {
    fn name(&self) -> &'static str {
        "engulfing"
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 1..candles.len() {
            let prev = &candles[i - 1];
            let cur = &candles[i];
            if prev.is_bearish()
                && cur.is_bullish()
                && cur.close > prev.open
                && cur.open < prev.close
            {
                out[i] = BULL;
            } else if prev.is_bullish()
                && cur.is_bearish()
                && cur.close < prev.open
                && cur.open > prev.close
            {
                out[i] = BEAR;
            }
        }
        Ok(out)
    }
}

/// Small body held inside the previous long body, in the opposite color.
pub struct Harami;

impl PatternDetector for Harami {
    fn name(&self) -> &'static str {
        "harami"
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 1..candles.len() {
            let prev = &candles[i - 1];
            let cur = &candles[i];
            let avg = avg_body(candles, i - 1);
            if !is_long_body(prev, avg) || !is_short_body(cur, avg) {
                continue;
            }
            let inside =
                cur.body_top() < prev.body_top() && cur.body_bottom() > prev.body_bottom();
            if inside && prev.is_bearish() && cur.is_bullish() {
                out[i] = BULL;
            } else if inside && prev.is_bullish() && cur.is_bearish() {
                out[i] = BEAR;
            }
        }
        Ok(out)
    }
}

/// Bullish close recovering past the midpoint of the previous bearish body.
pub struct Piercing;

impl PatternDetector for Piercing {
    fn name(&self) -> &'static str {
        "piercing"
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 1..candles.len() {
            let prev = &candles[i - 1];
            let cur = &candles[i];
            if prev.is_bearish()
                && is_long_body(prev, avg_body(candles, i - 1))
                && cur.is_bullish()
                && cur.open < prev.close
                && cur.close > prev.body_mid()
                && cur.close < prev.open
            {
                out[i] = BULL;
            }
        }
        Ok(out)
    }
}

pub struct DarkCloudCover;

impl PatternDetector for DarkCloudCover {
    fn name(&self) -> &'static str {
        "dark_cloud_cover"
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 1..candles.len() {
            let prev = &candles[i - 1];
            let cur = &candles[i];
            if prev.is_bullish()
                && is_long_body(prev, avg_body(candles, i - 1))
                && cur.is_bearish()
                && cur.open > prev.close
                && cur.close < prev.body_mid()
                && cur.close > prev.open
            {
                out[i] = BEAR;
            }
        }
        Ok(out)
    }
}
