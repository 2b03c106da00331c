use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    num::NonZero,
};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource,
    price_window::PriceWindow,
};

/// How many standard deviations the bands sit from the mean. `2.0` unless
/// set.
///
/// Always positive and never NaN, so comparing bit patterns is a sound `Eq`.
#[derive(Clone, Copy, Debug)]
pub struct StdDev(f64);

impl StdDev {
    /// # Panics
    ///
    /// Panics if `value` is zero, negative, or NaN.
    #[must_use]
    pub fn new(value: f64) -> Self {
        assert!(!value.is_nan(), "std_dev must not be NaN");
        assert!(value > 0.0, "std_dev must be positive");
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for StdDev {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for StdDev {}

impl Hash for StdDev {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for StdDev {
    fn default() -> Self {
        Self(2.0)
    }
}

/// Parameters of a [`Bb`]: window length, price source and band multiplier.
///
/// ```
/// use trendscore::{BbConfig, IndicatorConfig, IndicatorConfigBuilder, StdDev};
/// use std::num::NonZero;
///
/// let wide = BbConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .std_dev(StdDev::new(2.5))
///     .build();
///
/// assert_ne!(wide, BbConfig::default_20());
/// assert_eq!(wide.to_string(), "BbConfig(20, Close, 2.5)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BbConfig {
    length: usize,
    source: PriceSource,
    std_dev: StdDev,
}

impl IndicatorConfig for BbConfig {
    type Builder = BbConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        BbConfigBuilder {
            length: None,
            source: PriceSource::Close,
            std_dev: StdDev::default(),
        }
    }

    #[inline]
    fn source(&self) -> &PriceSource {
        &self.source
    }
}

impl BbConfig {
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    #[must_use]
    pub fn std_dev(&self) -> StdDev {
        self.std_dev
    }

    /// 20 closes, bands at 2σ. What the trend score reads %B from.
    #[must_use]
    pub fn default_20() -> Self {
        Self::close(NonZero::<usize>::MIN.saturating_add(19))
    }

    /// Closes, bands at 2σ.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }
}

impl Display for BbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BbConfig({}, {}, {})",
            self.length,
            self.source,
            self.std_dev.value()
        )
    }
}

/// Builder for [`BbConfig`]. Closes and 2σ unless set; the length is
/// required.
pub struct BbConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
    std_dev: StdDev,
}

impl BbConfigBuilder {
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn std_dev(mut self, std_dev: StdDev) -> Self {
        self.std_dev = std_dev;
        self
    }
}

impl IndicatorConfigBuilder<BbConfig> for BbConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    #[inline]
    fn build(self) -> BbConfig {
        BbConfig {
            length: self.length.expect("length is required"),
            source: self.source,
            std_dev: self.std_dev,
        }
    }
}

/// Bollinger Bands output for one bar.
///
/// ```text
/// upper  = mean + k × σ
/// middle = mean
/// lower  = mean − k × σ
/// ```
///
/// `σ` is the population standard deviation of the window. The value also
/// keeps the bar's price so it can place it within the bands
/// ([`percent_b`](Self::percent_b)).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BbValue {
    upper: Price,
    middle: Price,
    lower: Price,
    price: Price,
}

impl BbValue {
    /// Upper band: `mean + k × σ`.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Price {
        self.upper
    }

    /// Middle band: mean of the window.
    #[inline]
    #[must_use]
    pub fn middle(&self) -> Price {
        self.middle
    }

    /// Lower band: `mean − k × σ`.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Price {
        self.lower
    }

    /// The price the bands were evaluated against (the newest in the window).
    #[inline]
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Band width: `upper − lower`.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Width as a percentage of the middle band.
    ///
    /// `None` when the middle band is zero or negative.
    #[inline]
    #[must_use]
    pub fn bandwidth(&self) -> Option<f64> {
        (self.middle > 0.0).then(|| self.width() / self.middle * 100.0)
    }

    /// Position of the price within the bands: 0 on the lower band, 1 on the
    /// upper one.
    ///
    /// Falls outside `[0, 1]` when the price breaches a band. Collapsed
    /// bands (zero variance) give `0.5`.
    #[inline]
    #[must_use]
    pub fn percent_b(&self) -> f64 {
        if self.upper == self.lower {
            0.5
        } else {
            (self.price - self.lower) / self.width()
        }
    }
}

impl Display for BbValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB(u: {}, m: {}, l: {})",
            self.upper, self.middle, self.lower
        )
    }
}

/// Bollinger Bands.
///
/// Mean of the trailing window with bands `k` population standard deviations
/// either side. `None` until the window is full.
///
/// Mean and σ are recomputed over the window each bar, so a flat window has
/// exactly zero width and %B 0.5.
/// A bar with the current `open_time` replaces the newest price.
///
/// ```
/// use trendscore::{Bb, BbConfig};
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
/// let mut bb = Bb::new(BbConfig::close(NonZero::new(2).unwrap()));
///
/// assert!(bb.compute(&Day(40.0, 1)).is_none());
///
/// // window [40, 44]: mean 42, σ 2
/// let bands = bb.compute(&Day(44.0, 2)).unwrap();
/// assert_eq!((bands.lower(), bands.upper()), (38.0, 46.0));
/// assert_eq!(bands.percent_b(), 0.75);
/// assert_eq!(bands.bandwidth(), Some(8.0 / 42.0 * 100.0));
/// ```
#[derive(Clone, Debug)]
pub struct Bb {
    config: BbConfig,
    multiplier: f64,
    window: PriceWindow,
    current: Option<BbValue>,
}

impl Indicator for Bb {
    type Config = BbConfig;
    type Output = BbValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            multiplier: config.std_dev.value(),
            window: PriceWindow::new(config.length, config.source),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Self::Output> {
        self.window.add(ohlcv);

        self.current = self.window.mean().and_then(|mean| {
            let offset = self.window.std_dev()? * self.multiplier;

            Some(BbValue {
                upper: mean + offset,
                middle: mean,
                lower: mean - offset,
                price: self.window.latest()?,
            })
        });

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Display for Bb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB({}, {}, {})",
            self.config.length, self.config.source, self.multiplier,
        )
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{Kline, kline, nz};

    fn bb(length: usize) -> Bb {
        Bb::new(BbConfig::close(nz(length)))
    }

    fn bb_with_std_dev(length: usize, std_dev: f64) -> Bb {
        Bb::new(
            BbConfig::builder()
                .length(nz(length))
                .std_dev(StdDev::new(std_dev))
                .build(),
        )
    }

    fn assert_bands(value: Option<BbValue>, upper: f64, middle: f64, lower: f64) {
        let v = value.expect("expected Some(BbValue)");
        assert!((v.upper() - upper).abs() < 1e-10, "upper: {}", v.upper());
        assert!((v.middle() - middle).abs() < 1e-10, "middle: {}", v.middle());
        assert!((v.lower() - lower).abs() < 1e-10, "lower: {}", v.lower());
    }

    mod filling {
        use super::*;

        #[test]
        fn none_until_window_full() {
            let mut bb = bb(3);
            assert!(bb.compute(&kline(10.0, 1)).is_none());
            assert!(bb.compute(&kline(20.0, 2)).is_none());
            assert!(bb.value().is_none());
        }
    }

    mod computation {
        use super::*;

        #[test]
        fn basic_bands() {
            // [3, 5]: mean 4, σ 1
            let mut bb = bb(2);
            bb.compute(&kline(3.0, 1));
            assert_bands(bb.compute(&kline(5.0, 2)), 6.0, 4.0, 2.0);
        }

        #[test]
        fn uses_population_deviation() {
            // [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, population σ 2 (sample σ would be ~2.14)
            let mut bb = bb_with_std_dev(8, 1.0);
            let mut last = None;
            for (t, p) in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().enumerate() {
                last = bb.compute(&kline(p, t as u64));
            }
            assert_bands(last, 7.0, 5.0, 3.0);
        }

        #[test]
        fn updates_on_advance() {
            // [5, 7]: mean 6, σ 1
            let mut bb = bb(2);
            bb.compute(&kline(3.0, 1));
            bb.compute(&kline(5.0, 2));
            assert_bands(bb.compute(&kline(7.0, 3)), 8.0, 6.0, 4.0);
        }

        #[test]
        fn fractional_multiplier() {
            let mut bb = bb_with_std_dev(2, 1.5);
            bb.compute(&kline(3.0, 1));
            assert_bands(bb.compute(&kline(5.0, 2)), 5.5, 4.0, 2.5);
        }
    }

    mod derived {
        use super::*;

        fn value(upper: f64, middle: f64, lower: f64, price: f64) -> BbValue {
            BbValue {
                upper,
                middle,
                lower,
                price,
            }
        }

        #[test]
        fn percent_b_places_price_in_band() {
            assert_eq!(value(6.0, 4.0, 2.0, 2.0).percent_b(), 0.0);
            assert_eq!(value(6.0, 4.0, 2.0, 6.0).percent_b(), 1.0);
            assert_eq!(value(6.0, 4.0, 2.0, 5.0).percent_b(), 0.75);
        }

        #[test]
        fn percent_b_outside_bands() {
            assert_eq!(value(6.0, 4.0, 2.0, 8.0).percent_b(), 1.5);
            assert_eq!(value(6.0, 4.0, 2.0, 0.0).percent_b(), -0.5);
        }

        #[test]
        fn percent_b_midpoint_when_bands_collapse() {
            assert_eq!(value(10.0, 10.0, 10.0, 10.0).percent_b(), 0.5);
        }

        #[test]
        fn flat_series_midpoint_at_every_bar() {
            let mut bb = bb(20);
            for t in 0..40 {
                if let Some(v) = bb.compute(&kline(101.37, t)) {
                    assert_eq!(v.middle(), 101.37);
                    assert_eq!(v.width(), 0.0);
                    assert_eq!(v.percent_b(), 0.5);
                }
            }
            assert!(bb.value().is_some());
        }

        #[test]
        fn bandwidth_relative_to_middle() {
            assert_eq!(value(6.0, 4.0, 2.0, 4.0).bandwidth(), Some(100.0));
        }

        #[test]
        fn bandwidth_none_for_non_positive_middle() {
            assert_eq!(value(1.0, 0.0, -1.0, 0.0).bandwidth(), None);
            assert_eq!(value(-1.0, -2.0, -3.0, -2.0).bandwidth(), None);
        }
    }

    mod repaint {
        use super::*;

        #[test]
        fn replaces_current_bar() {
            // [3, 7]: mean 5, σ 2
            let mut bb = bb(2);
            bb.compute(&kline(3.0, 1));
            bb.compute(&kline(5.0, 2));
            let v = bb.compute(&kline(7.0, 2));
            assert_bands(v, 9.0, 5.0, 1.0);
            assert_eq!(v.unwrap().price(), 7.0);
        }

        #[test]
        fn repaint_during_filling() {
            let mut bb = bb(2);
            bb.compute(&kline(3.0, 1));
            assert!(bb.compute(&kline(4.0, 1)).is_none());
            // [4, 6]: mean 5, σ 1
            assert_bands(bb.compute(&kline(6.0, 2)), 7.0, 5.0, 3.0);
        }
    }

    mod price_source {
        use super::*;

        #[test]
        fn hl2_source() {
            let mut bb = Bb::new(
                BbConfig::builder()
                    .length(nz(2))
                    .source(PriceSource::HL2)
                    .build(),
            );
            bb.compute(&Kline::new(0.0, 20.0, 10.0, 0.0).at(1)); // 15
            let v = bb.compute(&Kline::new(0.0, 30.0, 20.0, 0.0).at(2)).unwrap(); // 25
            assert_eq!(v.middle(), 20.0);
            assert_eq!(v.price(), 25.0);
        }
    }

    mod config {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn defaults() {
            let config = BbConfig::default_20();
            assert_eq!(config.length(), 20);
            assert_eq!(config.std_dev(), StdDev::new(2.0));
            assert_eq!(*config.source(), PriceSource::Close);
        }

        #[test]
        #[should_panic(expected = "length is required")]
        fn panics_without_length() {
            let _ = BbConfig::builder().build();
        }

        #[test]
        #[should_panic(expected = "std_dev must be positive")]
        fn std_dev_rejects_zero() {
            let _ = StdDev::new(0.0);
        }

        #[test]
        #[should_panic(expected = "std_dev must be positive")]
        fn std_dev_rejects_negative() {
            let _ = StdDev::new(-1.0);
        }

        #[test]
        #[should_panic(expected = "std_dev must not be NaN")]
        fn std_dev_rejects_nan() {
            let _ = StdDev::new(f64::NAN);
        }

        #[test]
        fn display() {
            assert_eq!(BbConfig::default_20().to_string(), "BbConfig(20, Close, 2)");
            assert_eq!(bb(20).to_string(), "BB(20, Close, 2)");
        }

        #[test]
        fn eq_and_hash_include_multiplier() {
            let mut set = HashSet::new();
            set.insert(BbConfig::default_20());

            let wider = BbConfig::builder()
                .length(nz(20))
                .std_dev(StdDev::new(3.0))
                .build();

            assert!(set.contains(&BbConfig::close(nz(20))));
            assert!(!set.contains(&wider));
        }
    }
}
