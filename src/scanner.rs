use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::okx::MarketDataSource;
use crate::patterns::{self, PatternDetector, PatternError};
use crate::signal::{DetectorOutcome, Recency, Signal, SignalHit, SignalType};
use crate::types::{CandleSeries, RecencyMode, ScanRequest};

/// Fewest candles a series needs before any detector runs.
pub const MIN_CANDLES: usize = 10;
/// Candles requested per symbol during a sweep.
pub const CANDLE_FETCH_LIMIT: u32 = 100;
/// Largest accepted freshness threshold, counted in candles.
pub const MAX_CANDLE_AGE: u32 = 10;
/// Largest accepted freshness threshold, counted in whole minutes.
pub const MAX_WALLCLOCK_AGE_MIN: u32 = 1440;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no patterns selected")]
    EmptyPatternSelection,
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),
    #[error("max signal age {got} outside 0..={max} for {mode} recency")]
    AgeOutOfRange {
        got: u32,
        max: u32,
        mode: &'static str,
    },
}

/// Cooperative stop flag, checked between symbols during a sweep.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of one universe sweep: the fresh signals plus sweep accounting.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub signals: Vec<Signal>,
    pub symbols_scanned: usize,
    pub symbols_skipped: usize,
    pub pairs_attempted: usize,
    pub detector_failures: usize,
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

/// Stateless signal-recency scanner. Holds only the series-length floor; all
/// per-sweep configuration arrives with the request.
#[derive(Debug, Clone, Copy)]
pub struct SignalScanner {
    min_candles: usize,
}

impl Default for SignalScanner {
    fn default() -> Self {
        Self {
            min_candles: MIN_CANDLES,
        }
    }
}

impl SignalScanner {
    pub fn new(min_candles: usize) -> Self {
        Self { min_candles }
    }

    /// Runs one detector over one series and reports exactly what happened.
    pub fn evaluate(
        &self,
        series: &CandleSeries,
        detector: &dyn PatternDetector,
        max_signal_age: u32,
        mode: RecencyMode,
        now: DateTime<Utc>,
    ) -> DetectorOutcome {
        if series.len() < self.min_candles {
            return DetectorOutcome::NoSignal;
        }
        let candles = series.candles();
        let values = match detector.detect(candles) {
            Ok(values) => values,
            Err(e) => return DetectorOutcome::Failed(e),
        };
        if values.len() != candles.len() {
            return DetectorOutcome::Failed(PatternError::OutputLengthMismatch {
                expected: candles.len(),
                got: values.len(),
            });
        }
        // Most recent nonzero value wins; everything older is ignored.
        let Some(index) = values.iter().rposition(|&v| v != 0) else {
            return DetectorOutcome::NoSignal;
        };
        let Some(signal_type) = SignalType::from_value(values[index]) else {
            return DetectorOutcome::NoSignal;
        };
        let detected_at = candles[index].ts;
        let recency = match mode {
            RecencyMode::Candles => Recency::Candles((candles.len() - 1 - index) as u32),
            RecencyMode::WallClock => Recency::Minutes((now - detected_at).num_minutes().max(0)),
        };
        if !recency.within(max_signal_age) {
            return DetectorOutcome::NoSignal;
        }
        DetectorOutcome::Found(SignalHit {
            signal_type,
            recency,
            index,
            detected_at,
        })
    }

    /// Present-or-absent form of [`evaluate`](Self::evaluate): stale signals,
    /// short series and detector failures all collapse to `None`.
    pub fn scan(
        &self,
        series: &CandleSeries,
        detector: &dyn PatternDetector,
        max_signal_age: u32,
        mode: RecencyMode,
        now: DateTime<Utc>,
    ) -> Option<SignalHit> {
        self.evaluate(series, detector, max_signal_age, mode, now)
            .into_option()
    }

    /// Rejects bad requests before any network traffic happens.
    pub fn validate(&self, request: &ScanRequest) -> Result<(), ConfigError> {
        if request.patterns.is_empty() {
            return Err(ConfigError::EmptyPatternSelection);
        }
        for name in &request.patterns {
            if patterns::detector(name).is_none() {
                return Err(ConfigError::UnknownPattern(name.clone()));
            }
        }
        let (max, mode) = match request.recency {
            RecencyMode::Candles => (MAX_CANDLE_AGE, "candle"),
            RecencyMode::WallClock => (MAX_WALLCLOCK_AGE_MIN, "wall-clock"),
        };
        if request.max_signal_age > max {
            return Err(ConfigError::AgeOutOfRange {
                got: request.max_signal_age,
                max,
                mode,
            });
        }
        Ok(())
    }

    /// Sequential best-effort sweep over the universe. Per-symbol fetch
    /// failures and per-detector crashes never abort the sweep; only an
    /// invalid request does, and that before the first fetch.
    pub async fn scan_universe(
        &self,
        source: &dyn MarketDataSource,
        request: &ScanRequest,
        cancel: &CancelFlag,
    ) -> Result<ScanReport, ConfigError> {
        self.validate(request)?;
        let started = Instant::now();
        // One clock reading shared by every wall-clock comparison in the sweep.
        let now = Utc::now();

        let detectors: Vec<&'static dyn PatternDetector> = request
            .patterns
            .iter()
            .filter_map(|name| patterns::detector(name))
            .collect();

        let universe = if request.symbols.is_empty() {
            source.list_symbols().await
        } else {
            request.symbols.clone()
        };
        info!(
            "Scanning {} symbol(s) for {} pattern(s) on {}",
            universe.len(),
            detectors.len(),
            request.timeframe
        );

        let mut report = ScanReport {
            signals: Vec::new(),
            symbols_scanned: 0,
            symbols_skipped: 0,
            pairs_attempted: 0,
            detector_failures: 0,
            cancelled: false,
            elapsed_ms: 0,
        };

        for symbol in &universe {
            if cancel.is_cancelled() {
                report.cancelled = true;
                warn!("Sweep cancelled after {} symbol(s)", report.symbols_scanned);
                break;
            }
            let series = source
                .get_candles(symbol, request.timeframe, CANDLE_FETCH_LIMIT)
                .await;
            if series.len() < self.min_candles {
                report.symbols_skipped += 1;
                continue;
            }
            report.symbols_scanned += 1;

            for detector in &detectors {
                report.pairs_attempted += 1;
                match self.evaluate(&series, *detector, request.max_signal_age, request.recency, now)
                {
                    DetectorOutcome::Found(hit) => {
                        info!(
                            "{}: {} {} ({})",
                            symbol,
                            detector.name(),
                            hit.signal_type,
                            hit.recency
                        );
                        report.signals.push(Signal {
                            symbol: symbol.clone(),
                            pattern: detector.name().to_string(),
                            signal_type: hit.signal_type,
                            recency: hit.recency,
                            detected_at: hit.detected_at,
                        });
                    }
                    DetectorOutcome::NoSignal => {}
                    DetectorOutcome::Failed(e) => {
                        report.detector_failures += 1;
                        warn!("{}: detector {} failed: {}", symbol, detector.name(), e);
                    }
                }
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Sweep complete: {} signal(s) from {} symbol(s), {} skipped, in {}ms",
            report.signals.len(),
            report.symbols_scanned,
            report.symbols_skipped,
            report.elapsed_ms
        );
        Ok(report)
    }
}
