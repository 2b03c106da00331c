use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource,
    price_window::PriceWindow,
};

/// Parameters of a [`Sma`]: window length and price source.
///
/// ```
/// use trendscore::{IndicatorConfig, PriceSource, SmaConfig};
///
/// let short = SmaConfig::default_20();
/// let long = SmaConfig::default_50();
///
/// assert!(short.length() < long.length());
/// assert_eq!(*short.source(), PriceSource::Close);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SmaConfig {
    length: usize,
    source: PriceSource,
}

impl IndicatorConfig for SmaConfig {
    type Builder = SmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        SmaConfigBuilder {
            length: None,
            source: PriceSource::Close,
        }
    }

    #[inline]
    fn source(&self) -> &PriceSource {
        &self.source
    }
}

impl SmaConfig {
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Average of the last `length` closes.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }

    /// 20-bar close average, the short leg of the trend crossover.
    #[must_use]
    pub fn default_20() -> Self {
        Self::close(NonZero::<usize>::MIN.saturating_add(19))
    }

    /// 50-bar close average, the long leg of the trend crossover.
    #[must_use]
    pub fn default_50() -> Self {
        Self::close(NonZero::<usize>::MIN.saturating_add(49))
    }
}

impl Display for SmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SmaConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`SmaConfig`]. Reads closes unless told otherwise; the length
/// has no default.
pub struct SmaConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
}

impl SmaConfigBuilder {
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }
}

impl IndicatorConfigBuilder<SmaConfig> for SmaConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    /// # Panics
    ///
    /// Panics with "length is required" if no length was set.
    #[inline]
    fn build(self) -> SmaConfig {
        SmaConfig {
            length: self.length.expect("length is required"),
            source: self.source,
        }
    }
}

/// Simple moving average.
///
/// Mean of the trailing *n* prices. Over a history the first value lands on
/// index `n - 1`. A flat window averages to exactly its price, so averages of
/// different lengths over a flat run compare equal. A bar with the current
/// `open_time` replaces the newest price instead of sliding.
///
/// ```
/// use trendscore::{Sma, SmaConfig};
/// use std::num::NonZero;
/// # use trendscore::{Ohlcv, Price, Timestamp};
/// #
/// # struct Day(f64, u64);
/// # impl Ohlcv for Day {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.0 }
/// #     fn close(&self) -> Price { self.0 }
/// #     fn open_time(&self) -> Timestamp { self.1 }
/// # }
///
/// let mut sma = Sma::new(SmaConfig::close(NonZero::new(2).unwrap()));
///
/// assert_eq!(sma.compute(&Day(101.0, 1)), None);
/// assert_eq!(sma.compute(&Day(103.0, 2)), Some(102.0));
/// // the close moves before the day ends
/// assert_eq!(sma.compute(&Day(105.0, 2)), Some(103.0));
/// ```
#[derive(Clone, Debug)]
pub struct Sma {
    config: SmaConfig,
    window: PriceWindow,
    current: Option<Price>,
}

impl Indicator for Sma {
    type Config = SmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            window: PriceWindow::new(config.length, config.source),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Option<Price> {
        self.window.add(kline);
        self.current = self.window.mean();
        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({}, {})", self.config.length, self.config.source)
    }
}
