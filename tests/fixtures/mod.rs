#![allow(dead_code)]

use serde::{Deserialize, de::DeserializeOwned};
use trendscore::{Bar, BbValue, MacdValue, Ohlcv, Price, Timestamp};

/// Daily bar from the fixture history, numbered by position so it can drive
/// the streaming indicators.
#[derive(Debug, Clone)]
pub struct RefBar {
    pub date: String,
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv for RefBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn open_time(&self) -> Timestamp {
        self.open_time
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Reference value keyed by bar date.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub date: String,
    pub expected: f64,
}

#[derive(Debug, Deserialize)]
pub struct RefBbValue {
    pub date: String,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub percent_b: f64,
}

/// Signal and histogram are empty until the signal line warms up.
#[derive(Debug, Deserialize)]
pub struct RefMacdValue {
    pub date: String,
    pub macd: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

const OHLCV_PATH: &str = "tests/fixtures/data/daily-ohlcv.csv";

/// The fixture history as plain [`Bar`]s, oldest first.
pub fn load_bars() -> Vec<Bar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// The fixture history numbered for streaming.
pub fn load_reference_ohlcvs() -> Vec<RefBar> {
    load_bars()
        .into_iter()
        .enumerate()
        .map(|(index, bar)| RefBar {
            date: bar.date,
            open_time: index as u64,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })
        .collect()
}

/// Load single-value reference data (SMA, EMA, RSI, ATR).
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

pub fn load_bb_ref(path: &str) -> Vec<RefBbValue> {
    load_records(path, "invalid BB reference record")
}

pub fn load_macd_ref(path: &str) -> Vec<RefMacdValue> {
    load_records(path, "invalid MACD reference record")
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Creates perturbed versions of a bar to simulate live repaints.
///
/// Returns 2 intermediate bars (with shifted close/high/low) followed
/// by the original bar. All share the same `open_time`.
pub fn repaint_sequence(bar: &RefBar) -> Vec<RefBar> {
    let tick = |high: f64, low: f64, close: f64, volume: f64| RefBar {
        date: bar.date.clone(),
        open_time: bar.open_time,
        open: bar.open,
        high,
        low,
        close,
        volume,
    };

    vec![
        // opening tick: close near open
        tick(
            bar.open * 1.001,
            bar.open * 0.999,
            bar.open * 1.0005,
            bar.volume * 0.1,
        ),
        // halfway to the final values
        tick(
            bar.open.midpoint(bar.high),
            bar.open.midpoint(bar.low),
            bar.open.midpoint(bar.close),
            bar.volume * 0.5,
        ),
        tick(bar.high, bar.low, bar.close, bar.volume),
    ]
}

pub fn assert_values_match(
    bar_idx: usize,
    closed: Option<f64>,
    repainted: Option<f64>,
    tolerance: f64,
) {
    match (closed, repainted) {
        (None, None) => {}
        (Some(c), Some(r)) => {
            let diff = (c - r).abs();
            assert!(
                diff <= tolerance,
                "diverged at bar {bar_idx}: closed={c:.10}, repainted={r:.10}, diff={diff:.2e}"
            );
        }
        (c, r) => {
            panic!("warm-up mismatch at bar {bar_idx}: closed={c:?}, repainted={r:?}");
        }
    }
}

pub fn assert_bb_values_match(
    bar_idx: usize,
    closed: Option<BbValue>,
    repainted: Option<BbValue>,
    tolerance: f64,
) {
    match (closed, repainted) {
        (None, None) => {}
        (Some(c), Some(r)) => {
            for (band, cv, rv) in [
                ("upper", c.upper(), r.upper()),
                ("middle", c.middle(), r.middle()),
                ("lower", c.lower(), r.lower()),
                ("percent_b", c.percent_b(), r.percent_b()),
            ] {
                let diff = (cv - rv).abs();
                assert!(
                    diff <= tolerance,
                    "BB {band} diverged at bar {bar_idx}: closed={cv:.10}, repainted={rv:.10}, diff={diff:.2e}"
                );
            }
        }
        (c, r) => {
            panic!("BB warm-up mismatch at bar {bar_idx}: closed={c:?}, repainted={r:?}");
        }
    }
}

pub fn assert_macd_values_match(
    bar_idx: usize,
    closed: Option<MacdValue>,
    repainted: Option<MacdValue>,
    tolerance: f64,
) {
    match (closed, repainted) {
        (None, None) => {}
        (Some(c), Some(r)) => {
            assert_values_match(bar_idx, Some(c.macd()), Some(r.macd()), tolerance);
            assert_values_match(bar_idx, c.signal(), r.signal(), tolerance);
            assert_values_match(bar_idx, c.histogram(), r.histogram(), tolerance);
        }
        (c, r) => {
            panic!("MACD warm-up mismatch at bar {bar_idx}: closed={c:?}, repainted={r:?}");
        }
    }
}

/// Generate reference match + repaint tests for a single-value indicator.
///
/// Usage: `reference_test!(sma_20, Sma, SmaConfig::close(nz(20)), "tests/fixtures/data/sma-20-close.csv", 1e-6);`
#[allow(unused_macros)]
macro_rules! reference_test {
    ($name:ident, $ind:ty, $config:expr, $ref_path:expr, $tolerance:expr) => {
        mod $name {
            use super::fixtures::*;
            use std::num::NonZero;
            use trendscore::*;

            fn nz(n: usize) -> NonZero<usize> {
                NonZero::new(n).unwrap()
            }

            #[test]
            fn matches_reference() {
                let bars = load_reference_ohlcvs();
                let reference = load_ref_values($ref_path);
                let mut ind = <$ind>::new($config);

                let mut ref_idx = 0;
                for bar in &bars {
                    ind.compute(bar);

                    if ref_idx < reference.len() && bar.date == reference[ref_idx].date {
                        let value = ind.value().unwrap_or_else(|| {
                            panic!("{} returned None on {}", stringify!($name), bar.date)
                        });
                        assert_near(
                            value,
                            reference[ref_idx].expected,
                            $tolerance,
                            &format!("{} at bar {ref_idx} ({})", stringify!($name), bar.date),
                        );
                        ref_idx += 1;
                    } else {
                        assert_eq!(
                            ind.value(),
                            None,
                            "{} warmed up early on {}",
                            stringify!($name),
                            bar.date
                        );
                    }
                }

                assert_eq!(
                    ref_idx,
                    reference.len(),
                    "not all reference values checked: {ref_idx}/{}",
                    reference.len()
                );
            }

            #[test]
            fn repaint_matches_closed() {
                let bars = load_reference_ohlcvs();
                let mut closed = <$ind>::new($config);
                let mut repainted = <$ind>::new($config);

                for (i, bar) in bars.iter().enumerate() {
                    closed.compute(bar);
                    for tick in repaint_sequence(bar) {
                        repainted.compute(&tick);
                    }
                    assert_values_match(i, closed.value(), repainted.value(), $tolerance);
                }
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use reference_test;

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
