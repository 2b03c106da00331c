// src/test_util.rs

use crate::{Bar, Ohlcv, Price, Timestamp};
use std::num::NonZero;

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() <= e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

pub fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).expect("non zero value")
}

/// Streaming test bar with an explicit open time.
#[derive(Clone, Copy, Debug)]
pub struct Kline {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub open_time: u64,
}

impl Kline {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            open_time: 0,
        }
    }

    pub fn at(mut self, open_time: u64) -> Self {
        self.open_time = open_time;
        self
    }
}

/// Kline with just a close price and timestamp (OHLC all equal to close).
pub fn kline(close: f64, time: u64) -> Kline {
    Kline::new(close, close, close, close).at(time)
}

/// Kline with full OHLC at the given time.
pub fn ohlc(open: f64, high: f64, low: f64, close: f64, time: u64) -> Kline {
    Kline::new(open, high, low, close).at(time)
}

impl Ohlcv for Kline {
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
}

/// Daily bars whose OHLC all equal the given closes.
pub fn flat_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: format!("day-{i:03}"),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        })
        .collect()
}
