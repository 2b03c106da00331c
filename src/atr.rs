use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Timestamp,
    price_source::true_range, wilder::WilderAverage,
};

/// Configuration for the Average True Range ([`Atr`]) indicator.
///
/// ATR always reads the true range of each bar, so the source is fixed to
/// [`PriceSource::TrueRange`].
///
/// # Example
///
/// ```
/// use trendscore::{AtrConfig, IndicatorConfig, PriceSource};
///
/// let config = AtrConfig::default_14();
/// assert_eq!(config.length(), 14);
/// assert_eq!(*config.source(), PriceSource::TrueRange);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AtrConfig {
    length: usize,
}

impl IndicatorConfig for AtrConfig {
    type Builder = AtrConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        AtrConfigBuilder::new()
    }

    #[inline]
    fn source(&self) -> &PriceSource {
        &PriceSource::TrueRange
    }
}

impl AtrConfig {
    /// Number of true ranges averaged.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// ATR over `length` bars.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }

    /// ATR(14).
    #[must_use]
    pub fn default_14() -> Self {
        Self::new(NonZero::<usize>::MIN.saturating_add(13))
    }
}

impl Display for AtrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AtrConfig({})", self.length)
    }
}

/// Builder for [`AtrConfig`].
///
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build). Setting a source other than
/// [`PriceSource::TrueRange`] panics.
pub struct AtrConfigBuilder {
    length: Option<usize>,
}

impl AtrConfigBuilder {
    fn new() -> Self {
        Self { length: None }
    }

    /// Sets the number of true ranges averaged.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length.get());
        self
    }
}

impl IndicatorConfigBuilder<AtrConfig> for AtrConfigBuilder {
    /// # Panics
    ///
    /// Panics unless `source` is [`PriceSource::TrueRange`].
    #[inline]
    fn source(self, source: PriceSource) -> Self {
        assert_eq!(
            source,
            PriceSource::TrueRange,
            "ATR source is always TrueRange"
        );
        self
    }

    #[inline]
    fn build(self) -> AtrConfig {
        AtrConfig {
            length: self.length.expect("length is required"),
        }
    }
}

/// Average True Range (ATR).
///
/// Measures volatility from full OHLC bars. The true range of a bar is the
/// largest of `high − low`, `|high − prev_close|` and `|low − prev_close|`;
/// the first bar has no previous close and contributes nothing.
///
/// The first value is the mean of the true ranges of bars `1..=length`, so it
/// lands on the bar at index `length`. Afterwards Wilder's smoothing applies:
///
/// ```text
/// ATR = (prev_ATR × (length − 1) + TR) / length
/// ```
///
/// Feeding a bar with the same `open_time` replaces the forming bar.
///
/// # Example
///
/// ```
/// use trendscore::{Atr, AtrConfig};
/// use std::num::NonZero;
/// # use trendscore::{Ohlcv, Price, Timestamp};
/// #
/// # struct Bar(f64, f64, f64, u64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.2 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.1 }
/// #     fn close(&self) -> Price { self.2 }
/// #     fn open_time(&self) -> Timestamp { self.3 }
/// # }
///
/// let mut atr = Atr::new(AtrConfig::new(NonZero::new(2).unwrap()));
///
/// // Bar(high, low, close, time)
/// assert_eq!(atr.compute(&Bar(11.0, 9.0, 10.0, 1)), None);
/// assert_eq!(atr.compute(&Bar(12.0, 10.0, 11.0, 2)), None); // TR 2
/// assert_eq!(atr.compute(&Bar(15.0, 11.0, 14.0, 3)), Some(3.0)); // TR 4
/// ```
#[derive(Clone, Debug)]
pub struct Atr {
    config: AtrConfig,
    average: WilderAverage,
    cur_close: Option<Price>,
    prev_close: Option<Price>,
    current: Option<Price>,
    last_open_time: Option<Timestamp>,
}

impl Indicator for Atr {
    type Config = AtrConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            average: WilderAverage::new(config.length),
            cur_close: None,
            prev_close: None,
            current: None,
            last_open_time: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Self::Output> {
        debug_assert!(
            self.last_open_time.is_none_or(|t| t <= ohlcv.open_time()),
            "open_time must be non-decreasing: last={}, got={}",
            self.last_open_time.unwrap_or(0),
            ohlcv.open_time(),
        );

        let is_next_bar = self.last_open_time.is_none_or(|t| t < ohlcv.open_time());

        if is_next_bar {
            self.prev_close = self.cur_close;
            self.last_open_time = Some(ohlcv.open_time());
        }
        self.cur_close = Some(ohlcv.close());

        if self.prev_close.is_some() {
            let range = true_range(ohlcv.high(), ohlcv.low(), self.prev_close);
            self.current = self.average.update(range, is_next_bar);
        }

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Display for Atr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ATR({})", self.config.length)
    }
}
