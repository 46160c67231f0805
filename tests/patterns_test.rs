use candle_signals::patterns::{self, PatternDetector};
use candle_signals::types::Candle;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

fn candle(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        ts: base_time() + Duration::minutes(i as i64),
        open,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

/// Ten quiet bullish candles with a 0.4 body, so the trailing body average
/// settles at 0.4 for whatever gets appended afterwards.
fn history() -> Vec<Candle> {
    (0..10)
        .map(|i| candle(i, 100.0, 101.0, 99.0, 100.4))
        .collect()
}

fn detect(name: &str, candles: &[Candle]) -> Vec<i32> {
    patterns::detector(name)
        .unwrap_or_else(|| panic!("{} not registered", name))
        .detect(candles)
        .expect("detect should succeed")
}

#[test]
fn test_registry_lookup() {
    let names = patterns::pattern_names();
    println!("Registry holds {} detectors: {:?}", names.len(), names);

    assert!(names.len() >= 17, "expected the full detector set");
    for expected in ["engulfing", "hammer", "shooting_star", "doji", "morning_star"] {
        assert!(names.contains(&expected), "{} missing from registry", expected);
    }
    assert!(patterns::detector("engulfing").is_some());
    assert!(patterns::detector("head_and_shoulders").is_none());
}

#[test]
fn test_output_length_matches_input() {
    let candles = history();
    for detector in patterns::all_detectors() {
        let values = detector.detect(&candles).expect("detect should succeed");
        assert_eq!(
            values.len(),
            candles.len(),
            "{} returned a misaligned output",
            detector.name()
        );
    }
}

#[test]
fn test_detectors_reject_empty_input() {
    for detector in patterns::all_detectors() {
        assert!(
            detector.detect(&[]).is_err(),
            "{} accepted an empty series",
            detector.name()
        );
    }
}

#[test]
fn test_bullish_engulfing_marked_on_final_candle() {
    let mut candles = history();
    candles.push(candle(10, 100.6, 100.7, 99.9, 100.0));
    candles.push(candle(11, 99.8, 100.9, 99.7, 100.8));

    let values = detect("engulfing", &candles);
    assert!(values[..11].iter().all(|&v| v == 0), "history should stay quiet");
    assert_eq!(values[11], 100);
}

#[test]
fn test_bearish_engulfing() {
    let mut candles = history();
    candles.push(candle(10, 100.2, 100.7, 100.1, 100.6));
    candles.push(candle(11, 100.8, 100.9, 100.0, 100.1));

    let values = detect("engulfing", &candles);
    assert_eq!(values[11], -100);
}

#[test]
fn test_hammer_requires_long_lower_wick() {
    let mut candles = history();
    candles.push(candle(10, 100.4, 100.52, 98.0, 100.5));
    candles.push(candle(11, 100.5, 100.7, 100.45, 100.6));

    let values = detect("hammer", &candles);
    assert_eq!(values[10], 100, "long lower wick should read as a hammer");
    assert_eq!(values[11], 0, "wickless candle should not");
    assert!(values[..10].iter().all(|&v| v == 0));
}

#[test]
fn test_inverted_hammer() {
    let mut candles = history();
    candles.push(candle(10, 100.3, 102.0, 100.28, 100.4));

    let values = detect("inverted_hammer", &candles);
    assert_eq!(values[10], 100);
}

#[test]
fn test_doji_family() {
    let mut candles = history();
    candles.push(candle(10, 100.0, 101.0, 99.0, 100.02));
    candles.push(candle(11, 100.0, 100.05, 98.0, 100.01));
    candles.push(candle(12, 100.0, 102.0, 99.95, 99.99));

    let doji = detect("doji", &candles);
    assert_eq!(doji[10], 100);
    assert_eq!(doji[11], 100);
    assert_eq!(doji[12], 100);

    let dragonfly = detect("dragonfly_doji", &candles);
    assert_eq!(dragonfly[10], 0, "balanced wicks are not a dragonfly");
    assert_eq!(dragonfly[11], 100);

    let gravestone = detect("gravestone_doji", &candles);
    assert_eq!(gravestone[11], 0);
    assert_eq!(gravestone[12], -100);
}

#[test]
fn test_shooting_star_needs_gap_above_previous_body() {
    let mut candles = history();
    candles.push(candle(10, 101.0, 103.5, 100.95, 101.1));
    candles.push(candle(11, 100.2, 102.6, 100.15, 100.3));

    let values = detect("shooting_star", &candles);
    assert_eq!(values[10], -100, "gapped star should fire");
    assert_eq!(values[11], 0, "no gap, no star");
}

#[test]
fn test_hanging_man_wants_prior_advance() {
    let mut candles = history();
    candles.push(candle(10, 100.6, 100.72, 99.0, 100.7));
    candles.push(candle(11, 100.0, 100.12, 98.5, 100.1));

    let values = detect("hanging_man", &candles);
    assert_eq!(values[10], -100, "hammer shape above the prior midpoint");
    assert_eq!(values[11], 0, "same shape lower down is just a hammer");

    let hammer = detect("hammer", &candles);
    assert_eq!(hammer[11], 100);
}

#[test]
fn test_marubozu_direction_follows_color() {
    let mut candles = history();
    candles.push(candle(10, 100.0, 102.02, 99.99, 102.0));
    candles.push(candle(11, 102.0, 102.01, 99.98, 100.0));

    let values = detect("marubozu", &candles);
    assert_eq!(values[10], 100);
    assert_eq!(values[11], -100);
}

#[test]
fn test_spinning_top() {
    let mut candles = history();
    candles.push(candle(10, 100.3, 101.2, 99.6, 100.5));

    let values = detect("spinning_top", &candles);
    assert_eq!(values[10], 100);
}

#[test]
fn test_harami_inside_previous_body() {
    let mut candles = history();
    candles.push(candle(10, 101.5, 101.6, 99.9, 100.0));
    candles.push(candle(11, 100.4, 100.8, 100.3, 100.7));

    let values = detect("harami", &candles);
    assert_eq!(values[11], 100);

    let mut candles = history();
    candles.push(candle(10, 100.0, 101.6, 99.9, 101.5));
    candles.push(candle(11, 101.0, 101.1, 100.6, 100.7));

    let values = detect("harami", &candles);
    assert_eq!(values[11], -100);
}

#[test]
fn test_piercing_recovers_past_midpoint() {
    let mut candles = history();
    candles.push(candle(10, 101.5, 101.6, 99.9, 100.0));
    candles.push(candle(11, 99.7, 101.0, 99.6, 100.9));

    let values = detect("piercing", &candles);
    assert_eq!(values[11], 100);

    // Same setup but the close stalls below the midpoint.
    let mut weak = history();
    weak.push(candle(10, 101.5, 101.6, 99.9, 100.0));
    weak.push(candle(11, 99.7, 100.6, 99.6, 100.5));

    let values = detect("piercing", &weak);
    assert_eq!(values[11], 0);
}

#[test]
fn test_dark_cloud_cover() {
    let mut candles = history();
    candles.push(candle(10, 100.0, 101.6, 99.9, 101.5));
    candles.push(candle(11, 101.8, 101.9, 100.5, 100.6));

    let values = detect("dark_cloud_cover", &candles);
    assert_eq!(values[11], -100);
}

#[test]
fn test_morning_star() {
    let mut candles = history();
    candles.push(candle(10, 101.5, 101.6, 99.9, 100.0));
    candles.push(candle(11, 99.8, 99.85, 99.6, 99.7));
    candles.push(candle(12, 99.9, 101.1, 99.8, 101.0));

    let values = detect("morning_star", &candles);
    assert!(values[..12].iter().all(|&v| v == 0));
    assert_eq!(values[12], 100);
}

#[test]
fn test_evening_star() {
    let mut candles = history();
    candles.push(candle(10, 100.0, 101.6, 99.9, 101.5));
    candles.push(candle(11, 101.7, 101.9, 101.65, 101.8));
    candles.push(candle(12, 101.6, 101.65, 100.4, 100.5));

    let values = detect("evening_star", &candles);
    assert_eq!(values[12], -100);
}

#[test]
fn test_three_white_soldiers() {
    let mut candles = history();
    candles.push(candle(10, 100.2, 101.3, 100.1, 101.2));
    candles.push(candle(11, 100.9, 102.1, 100.8, 102.0));
    candles.push(candle(12, 101.7, 103.0, 101.6, 102.9));

    let values = detect("three_white_soldiers", &candles);
    assert_eq!(values[12], 100);
}

#[test]
fn test_three_black_crows() {
    let mut candles = history();
    candles.push(candle(10, 101.8, 101.9, 100.7, 100.8));
    candles.push(candle(11, 101.1, 101.2, 99.9, 100.0));
    candles.push(candle(12, 100.5, 100.6, 99.3, 99.4));

    let values = detect("three_black_crows", &candles);
    assert_eq!(values[12], -100);
}
