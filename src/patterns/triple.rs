use super::{
    avg_body, ensure_len, is_long_body, is_short_body, PatternDetector, PatternError, BEAR, BULL,
    SOLDIER_WICK_RATIO,
};
use crate::types::Candle;

/// Long bearish candle, a small body gapping below it, then a bullish close
/// back above the first candle's midpoint.
pub struct MorningStar;

impl PatternDetector for MorningStar {
    fn name(&self) -> &'static str {
        "morning_star"
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 2..candles.len() {
            let (first, star, last) = (&candles[i - 2], &candles[i - 1], &candles[i]);
            // Body classes measured against the window before the pattern.
            let avg = avg_body(candles, i - 2);
            if first.is_bearish()
                && is_long_body(first, avg)
                && is_short_body(star, avg)
                && star.body_top() < first.body_bottom()
                && last.is_bullish()
                && last.close > first.body_mid()
            {
                out[i] = BULL;
            }
        }
        Ok(out)
    }
}

pub struct EveningStar;

impl PatternDetector for EveningStar {
    fn name(&self) -> &'static str {
        "evening_star"
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 2..candles.len() {
            let (first, star, last) = (&candles[i - 2], &candles[i - 1], &candles[i]);
            let avg = avg_body(candles, i - 2);
            if first.is_bullish()
                && is_long_body(first, avg)
                && is_short_body(star, avg)
                && star.body_bottom() > first.body_top()
                && last.is_bearish()
                && last.close < first.body_mid()
            {
                out[i] = BEAR;
            }
        }
        Ok(out)
    }
}

/// Three long bullish candles, each opening inside the previous body and
/// closing at a new high with little upper wick.
pub struct ThreeWhiteSoldiers;

impl PatternDetector for ThreeWhiteSoldiers {
    fn name(&self) -> &'static str {
        "three_white_soldiers"
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 2..candles.len() {
            let trio = &candles[i - 2..=i];
            let avg = avg_body(candles, i - 2);
            let all_soldiers = trio.iter().all(|c| {
                c.is_bullish()
                    && is_long_body(c, avg)
                    && c.range() > f64::EPSILON
                    && c.upper_wick() <= SOLDIER_WICK_RATIO * c.range()
            });
            let stepping = trio.windows(2).all(|w| {
                w[1].open > w[0].body_bottom()
                    && w[1].open < w[0].body_top()
                    && w[1].close > w[0].close
            });
            if all_soldiers && stepping {
                out[i] = BULL;
            }
        }
        Ok(out)
    }
}

pub struct ThreeBlackCrows;

impl PatternDetector for ThreeBlackCrows {
    fn name(&self) -> &'static str {
        "three_black_crows"
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect(&self, candles: &[Candle]) -> Result<Vec<i32>, PatternError> {
        ensure_len(candles, self.min_candles())?;
        let mut out = vec![0; candles.len()];
        for i in 2..candles.len() {
            let trio = &candles[i - 2..=i];
            let avg = avg_body(candles, i - 2);
            let all_crows = trio.iter().all(|c| {
                c.is_bearish()
                    && is_long_body(c, avg)
                    && c.range() > f64::EPSILON
                    && c.lower_wick() <= SOLDIER_WICK_RATIO * c.range()
            });
            let stepping = trio.windows(2).all(|w| {
                w[1].open > w[0].body_bottom()
                    && w[1].open < w[0].body_top()
                    && w[1].close < w[0].close
            });
            if all_crows && stepping {
                out[i] = BEAR;
            }
        }
        Ok(out)
    }
}
