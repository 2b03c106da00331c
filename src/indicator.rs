use crate::{Ohlcv, PriceSource};

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// An incrementally updated indicator over a bar stream.
///
/// Each [`compute`](Indicator::compute) folds one bar into the state and
/// returns the current output. Until the indicator has seen enough bars the
/// output is `None`; it never goes back to `None` afterwards.
///
/// Bars are told apart by [`Ohlcv::open_time`]. Feeding the same `open_time`
/// twice replaces the forming bar, so a live feed can push every tick.
///
/// # Example
///
/// ```
/// use trendscore::{Indicator, Rsi, RsiConfig};
/// use std::num::NonZero;
/// # use trendscore::{Ohlcv, Price, Timestamp};
/// #
/// # struct Close(f64, u64);
/// # impl Ohlcv for Close {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.0 }
/// #     fn close(&self) -> Price { self.0 }
/// #     fn open_time(&self) -> Timestamp { self.1 }
/// # }
///
/// fn latest<I: Indicator>(indicator: &mut I, closes: &[f64]) -> Option<I::Output> {
///     indicator
///         .compute_each(closes.iter().zip(0..).map(|(&c, t)| Close(c, t)))
///         .pop()
///         .flatten()
/// }
///
/// let mut rsi = Rsi::new(RsiConfig::close(NonZero::new(2).unwrap()));
/// assert_eq!(latest(&mut rsi, &[10.0, 11.0, 12.0]), Some(100.0));
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    type Config: IndicatorConfig;

    /// `f64` for single-line indicators; a value struct for Bollinger Bands
    /// and MACD.
    type Output: Copy + Send + Sync + Display + Debug;

    fn new(config: Self::Config) -> Self;

    /// Folds `kline` into the state and returns the updated output.
    fn compute(&mut self, kline: &impl Ohlcv) -> Option<Self::Output>;

    /// The output of the last [`compute`](Indicator::compute). No work is
    /// done here.
    fn value(&self) -> Option<Self::Output>;

    /// Computes every bar in order, collecting one output per bar.
    fn compute_each<K: Ohlcv>(
        &mut self,
        klines: impl IntoIterator<Item = K>,
    ) -> Vec<Option<Self::Output>> {
        klines.into_iter().map(|kline| self.compute(&kline)).collect()
    }
}

/// Parameters of an [`Indicator`].
///
/// Configs are small `Copy` values, so they can key maps and be compared
/// when deduplicating indicator sets. Lengths live on the concrete configs
/// because indicators take different numbers of them.
pub trait IndicatorConfig: Sized + PartialEq + Eq + Hash + Display + Debug {
    type Builder: IndicatorConfigBuilder<Self>;

    /// A builder holding the defaults for this config.
    fn builder() -> Self::Builder;

    /// Which price of each bar the indicator reads.
    fn source(&self) -> &PriceSource;
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    #[must_use]
    fn source(self, source: PriceSource) -> Self;

    /// # Panics
    ///
    /// If a required field (usually the length) was never set.
    #[must_use]
    fn build(self) -> Config;
}
