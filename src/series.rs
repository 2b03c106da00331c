//! Whole-history indicator functions.
//!
//! Each function runs a fresh streaming indicator across the input and
//! collects one output per element, so `output.len() == input.len()` and
//! `output[i]` depends only on `input[..=i]`. Warm-up positions are `None`.
//! Results match the streaming indicators bit for bit.
//!
//! ```
//! use trendscore::series;
//! use std::num::NonZero;
//!
//! let closes = [10.0, 11.0, 12.0, 13.0];
//! let sma = series::sma(&closes, NonZero::new(3).unwrap());
//!
//! assert_eq!(sma, vec![None, None, Some(11.0), Some(12.0)]);
//! ```

use std::num::NonZero;

use crate::{
    Atr, AtrConfig, Bar, Bb, BbConfig, BbValue, Ema, EmaConfig, Indicator, MacdConfig, MacdValue,
    Price, Rsi, RsiConfig, Sma, SmaConfig, Timestamp,
    ohlcv::{Point, Sequenced},
};

/// Closing prices of `bars`, in order.
#[must_use]
pub fn closes(bars: &[Bar]) -> Vec<Price> {
    bars.iter().map(|bar| bar.close).collect()
}

/// Simple moving average of `closes`. First value at index `length − 1`.
#[must_use]
pub fn sma(closes: &[Price], length: NonZero<usize>) -> Vec<Option<Price>> {
    over_values(Sma::new(SmaConfig::close(length)), closes)
}

/// Exponential moving average of `closes`, seeded with the SMA at index
/// `length − 1`.
#[must_use]
pub fn ema(closes: &[Price], length: NonZero<usize>) -> Vec<Option<Price>> {
    over_values(Ema::new(EmaConfig::close(length)), closes)
}

/// Wilder RSI of `closes`. First value at index `length`.
#[must_use]
pub fn rsi(closes: &[Price], length: NonZero<usize>) -> Vec<Option<Price>> {
    over_values(Rsi::new(RsiConfig::close(length)), closes)
}

/// Bollinger Bands of `closes`, evaluated against each close.
#[must_use]
pub fn bollinger(closes: &[Price], config: BbConfig) -> Vec<Option<BbValue>> {
    over_values(Bb::new(config), closes)
}

/// Average true range of `bars`. First value at index `length`.
#[must_use]
pub fn atr(bars: &[Bar], length: NonZero<usize>) -> Vec<Option<Price>> {
    over_bars(Atr::new(AtrConfig::new(length)), bars)
}

/// MACD of `closes`.
///
/// The MACD line is defined from index `slow − 1`. The signal line is an EMA
/// over the defined part of the line only, placed back at the indices it
/// came from.
#[must_use]
pub fn macd(closes: &[Price], config: MacdConfig) -> Vec<Option<MacdValue>> {
    let fast = ema(closes, length(config.fast_length()));
    let slow = ema(closes, length(config.slow_length()));

    let line: Vec<Option<Price>> = fast
        .iter()
        .zip(&slow)
        .map(|(fast, slow)| Some((*fast)? - (*slow)?))
        .collect();

    let dense = DenseSeries::compact(&line);
    let signal = dense.scatter(&over_values(
        Ema::new(config.signal_config()),
        dense.values(),
    ));

    line.iter()
        .zip(signal)
        .map(|(macd, signal)| macd.map(|macd| MacdValue::new(macd, signal)))
        .collect()
}

/// The defined entries of a sparse series, each tagged with its original
/// index.
///
/// Lets a transform that expects contiguous input (such as an EMA) run over
/// a series with gaps, then puts the results back where they belong.
///
/// ```
/// use trendscore::series::DenseSeries;
///
/// let sparse = [None, Some(1.0), None, Some(3.0)];
/// let dense = DenseSeries::compact(&sparse);
/// assert_eq!(dense.values(), &[1.0, 3.0]);
///
/// let doubled: Vec<_> = dense.values().iter().map(|v| Some(v * 2.0)).collect();
/// assert_eq!(dense.scatter(&doubled), vec![None, Some(2.0), None, Some(6.0)]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DenseSeries<T> {
    indices: Vec<usize>,
    values: Vec<T>,
    len: usize,
}

impl<T: Copy> DenseSeries<T> {
    /// Collects the `Some` entries of `series` in order.
    #[must_use]
    pub fn compact(series: &[Option<T>]) -> Self {
        let (indices, values) = series
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.map(|value| (index, value)))
            .unzip();

        Self {
            indices,
            values,
            len: series.len(),
        }
    }

    /// The defined values, without gaps.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Length of the original series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Places `transformed[k]` at the original index of `values()[k]`;
    /// every other position is `None`.
    ///
    /// `transformed` should be as long as [`values`](Self::values); extra
    /// entries are ignored and missing ones stay `None`.
    #[must_use]
    pub fn scatter<U: Copy>(&self, transformed: &[Option<U>]) -> Vec<Option<U>> {
        let mut scattered = vec![None; self.len];
        for (&index, &value) in self.indices.iter().zip(transformed) {
            scattered[index] = value;
        }
        scattered
    }
}

fn over_values<I: Indicator>(mut indicator: I, values: &[Price]) -> Vec<Option<I::Output>> {
    indicator.compute_each(
        values
            .iter()
            .enumerate()
            .map(|(index, &value)| Point::new(value, index as Timestamp)),
    )
}

fn over_bars<I: Indicator>(mut indicator: I, bars: &[Bar]) -> Vec<Option<I::Output>> {
    indicator.compute_each(
        bars.iter()
            .enumerate()
            .map(|(index, bar)| Sequenced::new(index, bar)),
    )
}

fn length(length: usize) -> NonZero<usize> {
    NonZero::new(length).expect("MacdConfig lengths are non-zero")
}
