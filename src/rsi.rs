use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Timestamp,
    wilder::WilderAverage,
};

/// Parameters of a [`Rsi`].
///
/// `length` counts price changes, not bars: the first value needs
/// `length + 1` bars.
///
/// ```
/// use trendscore::RsiConfig;
///
/// assert_eq!(RsiConfig::default_14().length(), 14);
/// assert_eq!(RsiConfig::default_14().to_string(), "RsiConfig(14, Close)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RsiConfig {
    length: usize,
    source: PriceSource,
}

impl IndicatorConfig for RsiConfig {
    type Builder = RsiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RsiConfigBuilder {
            length: None,
            source: PriceSource::Close,
        }
    }

    #[inline]
    fn source(&self) -> &PriceSource {
        &self.source
    }
}

impl RsiConfig {
    /// Number of price changes averaged.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }

    /// The classic 14-period RSI on closes.
    #[must_use]
    pub fn default_14() -> Self {
        Self::close(NonZero::<usize>::MIN.saturating_add(13))
    }
}

impl Display for RsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsiConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`RsiConfig`]. Source defaults to the close; the length is
/// required.
pub struct RsiConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
}

impl RsiConfigBuilder {
    /// Number of price changes averaged.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }
}

impl IndicatorConfigBuilder<RsiConfig> for RsiConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    #[inline]
    fn build(self) -> RsiConfig {
        RsiConfig {
            length: self.length.expect("length is required"),
            source: self.source,
        }
    }
}

/// Relative Strength Index, Wilder-smoothed, on a 0 to 100 scale.
///
/// Gains and losses of the first `length` price changes are averaged
/// plainly. Each later change is folded in with Wilder's recurrence:
///
/// ```text
/// avg_gain = (prev_avg_gain × (length − 1) + gain) / length
/// avg_loss = (prev_avg_loss × (length − 1) + loss) / length
/// RSI      = 100 − 100 / (1 + avg_gain / avg_loss)
/// ```
///
/// When `avg_loss` is zero the RSI is 100, whatever the average gain:
/// a window without losses reads as full strength, including a flat one.
///
/// A repaint (same `open_time`) re-applies the change against the
/// previous bar's averages.
///
/// ```
/// use trendscore::{Rsi, RsiConfig};
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
/// let mut rsi = Rsi::new(RsiConfig::close(NonZero::new(2).unwrap()));
///
/// assert_eq!(rsi.compute(&Day(50.0, 1)), None);
/// assert_eq!(rsi.compute(&Day(53.0, 2)), None);
/// // +3, -1: RS = 3
/// assert_eq!(rsi.compute(&Day(52.0, 3)), Some(75.0));
/// // no loss yet on the repainted day
/// assert_eq!(rsi.compute(&Day(54.0, 3)), Some(100.0));
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
    avg_gain: WilderAverage,
    avg_loss: WilderAverage,
    /// Source price of the last closed bar.
    prev_price: Option<Price>,
    cur_price: Option<Price>,
    cur_close: Option<Price>,
    prev_close: Option<Price>,
    current: Option<Price>,
    last_open_time: Option<Timestamp>,
}

impl Indicator for Rsi {
    type Config = RsiConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            avg_gain: WilderAverage::new(config.length),
            avg_loss: WilderAverage::new(config.length),
            prev_price: None,
            cur_price: None,
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
            self.prev_price = self.cur_price;
            self.last_open_time = Some(ohlcv.open_time());
        }

        let price = self.config.source.extract(ohlcv, self.prev_close);
        self.cur_price = Some(price);
        self.cur_close = Some(ohlcv.close());

        // The first bar has no change to contribute.
        let Some(prev_price) = self.prev_price else {
            return self.current;
        };

        let (gain, loss) = Self::gain_and_loss(prev_price, price);
        let avg_gain = self.avg_gain.update(gain, is_next_bar);
        let avg_loss = self.avg_loss.update(loss, is_next_bar);

        self.current = avg_gain
            .zip(avg_loss)
            .map(|(avg_gain, avg_loss)| Self::rsi_from_averages(avg_gain, avg_loss));

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Rsi {
    #[inline]
    fn gain_and_loss(prev_price: Price, price: Price) -> (Price, Price) {
        let change = price - prev_price;

        (change.max(0.0), (-change).max(0.0))
    }

    #[inline]
    fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({}, {})", self.config.length, self.config.source)
    }
}
