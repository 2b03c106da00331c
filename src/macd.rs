use std::{fmt::Display, num::NonZero};

use crate::{
    Ema, EmaConfig, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource,
    ohlcv::Point,
};

/// Configuration for the Moving Average Convergence Divergence ([`Macd`])
/// indicator.
///
/// # Example
///
/// ```
/// use trendscore::{IndicatorConfig, IndicatorConfigBuilder, MacdConfig};
/// use std::num::NonZero;
///
/// let config = MacdConfig::builder()
///     .fast_length(NonZero::new(5).unwrap())
///     .slow_length(NonZero::new(35).unwrap())
///     .signal_length(NonZero::new(5).unwrap())
///     .build();
///
/// assert_eq!(config.to_string(), "MacdConfig(5, 35, 5, Close)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct MacdConfig {
    fast_length: usize,
    slow_length: usize,
    signal_length: usize,
    source: PriceSource,
}

impl IndicatorConfig for MacdConfig {
    type Builder = MacdConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        MacdConfigBuilder::new()
    }

    #[inline]
    fn source(&self) -> &PriceSource {
        &self.source
    }
}

impl MacdConfig {
    /// Length of the fast EMA.
    #[inline]
    #[must_use]
    pub fn fast_length(&self) -> usize {
        self.fast_length
    }

    /// Length of the slow EMA.
    #[inline]
    #[must_use]
    pub fn slow_length(&self) -> usize {
        self.slow_length
    }

    /// Length of the EMA over the MACD line.
    #[inline]
    #[must_use]
    pub fn signal_length(&self) -> usize {
        self.signal_length
    }

    /// MACD(12, 26, 9) on closing price.
    #[allow(clippy::missing_panics_doc)]
    #[must_use]
    pub fn default_12_26_9() -> Self {
        Self::builder().build()
    }

    pub(crate) fn signal_config(&self) -> EmaConfig {
        ema_config(self.signal_length, PriceSource::Close)
    }
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self::default_12_26_9()
    }
}

impl Display for MacdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacdConfig({}, {}, {}, {})",
            self.fast_length, self.slow_length, self.signal_length, self.source
        )
    }
}

/// Builder for [`MacdConfig`].
///
/// Defaults: fast = 12, slow = 26, signal = 9, source =
/// [`PriceSource::Close`].
pub struct MacdConfigBuilder {
    fast_length: usize,
    slow_length: usize,
    signal_length: usize,
    source: PriceSource,
}

impl MacdConfigBuilder {
    fn new() -> Self {
        Self {
            fast_length: 12,
            slow_length: 26,
            signal_length: 9,
            source: PriceSource::Close,
        }
    }

    #[inline]
    #[must_use]
    pub fn fast_length(mut self, length: NonZero<usize>) -> Self {
        self.fast_length = length.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn slow_length(mut self, length: NonZero<usize>) -> Self {
        self.slow_length = length.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn signal_length(mut self, length: NonZero<usize>) -> Self {
        self.signal_length = length.get();
        self
    }
}

impl IndicatorConfigBuilder<MacdConfig> for MacdConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    /// # Panics
    ///
    /// Panics if the fast length is not shorter than the slow length.
    #[inline]
    fn build(self) -> MacdConfig {
        assert!(
            self.fast_length < self.slow_length,
            "fast length must be less than slow length: fast={}, slow={}",
            self.fast_length,
            self.slow_length,
        );

        MacdConfig {
            fast_length: self.fast_length,
            slow_length: self.slow_length,
            signal_length: self.signal_length,
            source: self.source,
        }
    }
}

fn ema_config(length: usize, source: PriceSource) -> EmaConfig {
    let length = NonZero::new(length).expect("MacdConfig lengths are non-zero");
    EmaConfig::builder().length(length).source(source).build()
}

/// MACD output for one bar.
///
/// The MACD line exists once the slow EMA has warmed up. The signal line and
/// histogram follow `signal_length − 1` bars later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    macd: f64,
    signal: Option<f64>,
    histogram: Option<f64>,
}

impl MacdValue {
    pub(crate) fn new(macd: f64, signal: Option<f64>) -> Self {
        Self {
            macd,
            signal,
            histogram: signal.map(|signal| macd - signal),
        }
    }

    /// Fast EMA minus slow EMA.
    #[inline]
    #[must_use]
    pub fn macd(&self) -> f64 {
        self.macd
    }

    /// EMA of the MACD line.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> Option<f64> {
        self.signal
    }

    /// MACD minus signal.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> Option<f64> {
        self.histogram
    }
}

impl Display for MacdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MACD(m: {}", self.macd)?;
        if let (Some(signal), Some(histogram)) = (self.signal, self.histogram) {
            write!(f, ", s: {signal}, h: {histogram}")?;
        }
        write!(f, ")")
    }
}

/// Moving Average Convergence Divergence (MACD).
///
/// ```text
/// macd      = EMA(fast) − EMA(slow)
/// signal    = EMA(signal_length) over the MACD line
/// histogram = macd − signal
/// ```
///
/// The signal EMA only ever sees bars where the MACD line exists, so it seeds
/// from the first `signal_length` MACD values rather than from warm-up gaps.
/// Repainting a bar repaints all three EMAs.
///
/// # Example
///
/// ```
/// use trendscore::{Macd, MacdConfig};
/// # use trendscore::{Ohlcv, Price, Timestamp};
/// #
/// # struct Bar(f64, u64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.0 }
/// #     fn close(&self) -> Price { self.0 }
/// #     fn open_time(&self) -> Timestamp { self.1 }
/// # }
///
/// let mut macd = Macd::new(MacdConfig::default_12_26_9());
///
/// for t in 0..25 {
///     assert!(macd.compute(&Bar(100.0 + t as f64, t)).is_none());
/// }
///
/// let value = macd.compute(&Bar(125.0, 25)).unwrap();
/// assert!(value.macd() > 0.0);
/// assert_eq!(value.signal(), None);
/// ```
#[derive(Clone, Debug)]
pub struct Macd {
    config: MacdConfig,
    fast: Ema,
    slow: Ema,
    signal: Ema,
    current: Option<MacdValue>,
}

impl Indicator for Macd {
    type Config = MacdConfig;
    type Output = MacdValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            fast: Ema::new(ema_config(config.fast_length, config.source)),
            slow: Ema::new(ema_config(config.slow_length, config.source)),
            signal: Ema::new(config.signal_config()),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Self::Output> {
        let fast = self.fast.compute(ohlcv);
        let slow = self.slow.compute(ohlcv);

        self.current = fast.zip(slow).map(|(fast, slow)| {
            let macd = fast - slow;
            let signal = self.signal.compute(&Point::new(macd, ohlcv.open_time()));

            MacdValue::new(macd, signal)
        });

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Macd {
    /// Histogram of the last bar, if any.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> Option<Price> {
        self.current.and_then(|value| value.histogram)
    }
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({}, {}, {}, {})",
            self.config.fast_length,
            self.config.slow_length,
            self.config.signal_length,
            self.config.source
        )
    }
}
