use serde::{Deserialize, Serialize};

/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar open timestamp or sequence number.
///
/// Used for bar boundary detection. Must be non-decreasing
/// between consecutive calls to [`Indicator::compute`](crate::Indicator::compute).
pub type Timestamp = u64;

/// OHLCV bar data used as input to the streaming indicators.
///
/// Implement this on your own kline/candle type to avoid per-tick
/// conversion. Indicators accept `&impl Ohlcv` and extract the
/// configured [`PriceSource`](crate::PriceSource) internally.
///
/// # Bar boundaries
///
/// Indicators detect new bars by comparing [`open_time`](Ohlcv::open_time)
/// values: same timestamp updates (repaints) the current bar, a new timestamp
/// advances the window.
///
/// # Example
///
/// ```
/// use trendscore::{Ohlcv, Price, Timestamp};
///
/// struct MyKline {
///     o: f64, h: f64, l: f64, c: f64,
///     ts: u64,
/// }
///
/// impl Ohlcv for MyKline {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn open_time(&self) -> Timestamp { self.ts }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing (or latest) price of the bar.
    fn close(&self) -> Price;

    /// Bar open timestamp or sequence number.
    ///
    /// Consecutive calls with the same value repaint the current bar; a new
    /// value advances the indicator window. Values must be non-decreasing.
    fn open_time(&self) -> Timestamp;

    /// Trade volume during the bar. Defaults to `0.0`.
    fn volume(&self) -> f64 {
        0.0
    }
}

/// One period of price history as delivered by a market-data provider.
///
/// The `date` is an opaque label: it is carried through untouched and never
/// parsed. A history is a slice of bars in chronological ascending order, and
/// that order is what the indicators rely on.
///
/// `Bar` deliberately has no timestamp, so it does not implement [`Ohlcv`].
/// The [`series`](crate::series) functions and the
/// [`TrendScorer`](crate::TrendScorer) number bars by their position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: String,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    #[serde(default)]
    pub volume: f64,
}

/// A borrowed [`Bar`] tagged with its position in the history.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Sequenced<'a> {
    bar: &'a Bar,
    seq: Timestamp,
}

impl<'a> Sequenced<'a> {
    #[inline]
    pub(crate) fn new(index: usize, bar: &'a Bar) -> Self {
        Self {
            bar,
            seq: index as Timestamp,
        }
    }
}

impl Ohlcv for Sequenced<'_> {
    #[inline]
    fn open(&self) -> Price {
        self.bar.open
    }

    #[inline]
    fn high(&self) -> Price {
        self.bar.high
    }

    #[inline]
    fn low(&self) -> Price {
        self.bar.low
    }

    #[inline]
    fn close(&self) -> Price {
        self.bar.close
    }

    #[inline]
    fn open_time(&self) -> Timestamp {
        self.seq
    }

    #[inline]
    fn volume(&self) -> f64 {
        self.bar.volume
    }
}

/// A single value posing as a bar: all four prices equal `value`.
///
/// Lets close-only series (and derived lines such as MACD) drive the
/// streaming indicators.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Point {
    pub(crate) value: Price,
    pub(crate) seq: Timestamp,
}

impl Point {
    #[inline]
    pub(crate) fn new(value: Price, seq: Timestamp) -> Self {
        Self { value, seq }
    }
}

impl Ohlcv for Point {
    #[inline]
    fn open(&self) -> Price {
        self.value
    }

    #[inline]
    fn high(&self) -> Price {
        self.value
    }

    #[inline]
    fn low(&self) -> Price {
        self.value
    }

    #[inline]
    fn close(&self) -> Price {
        self.value
    }

    #[inline]
    fn open_time(&self) -> Timestamp {
        self.seq
    }
}
