use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Sma, SmaConfig,
    Timestamp,
};

/// Parameters of an [`Ema`]. The smoothing factor follows from the length.
///
/// ```
/// use trendscore::EmaConfig;
/// use std::num::NonZero;
///
/// // the fast leg of MACD(12, 26, 9)
/// let fast = EmaConfig::close(NonZero::new(12).unwrap());
/// assert!((fast.alpha() - 2.0 / 13.0).abs() < 1e-15);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmaConfig {
    length: usize,
    source: PriceSource,
}

impl IndicatorConfig for EmaConfig {
    type Builder = EmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        EmaConfigBuilder {
            length: None,
            source: PriceSource::Close,
        }
    }

    #[inline]
    fn source(&self) -> &PriceSource {
        &self.source
    }
}

impl EmaConfig {
    /// Bars in the seed average; also sets [`alpha`](Self::alpha).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Smoothing factor `2 / (length + 1)`.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let denominator = (self.length + 1) as f64;
        2.0 / denominator
    }

    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmaConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`EmaConfig`]. Source defaults to the close; the length is
/// required.
pub struct EmaConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
}

impl EmaConfigBuilder {
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }
}

impl IndicatorConfigBuilder<EmaConfig> for EmaConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    #[inline]
    fn build(self) -> EmaConfig {
        EmaConfig {
            length: self.length.expect("length is required"),
            source: self.source,
        }
    }
}

#[derive(Clone, Debug)]
enum EmaPhase {
    /// Collecting the first `length` prices into an SMA.
    Seeding { sma: Sma, seen_bars: usize },
    /// Running the recurrence. `previous` is the EMA as of the last closed bar.
    Active { previous: Price },
}

/// Exponential moving average, seeded with a simple one.
///
/// Nothing is emitted until `length` bars are in; the first value is their
/// SMA, bit for bit. Afterwards:
///
/// ```text
/// EMA = α × price + (1 − α) × prev_EMA,   α = 2 / (length + 1)
/// ```
///
/// A repaint recomputes from the EMA of the last closed bar.
///
/// ```
/// use trendscore::{Ema, EmaConfig};
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
/// let mut ema = Ema::new(EmaConfig::close(NonZero::new(3).unwrap()));
///
/// assert_eq!(ema.compute(&Day(20.0, 1)), None);
/// assert_eq!(ema.compute(&Day(22.0, 2)), None);
/// // seed: (20 + 22 + 27) / 3
/// assert_eq!(ema.compute(&Day(27.0, 3)), Some(23.0));
/// // α = 0.5
/// assert_eq!(ema.compute(&Day(31.0, 4)), Some(27.0));
/// // repaint against the same seed
/// assert_eq!(ema.compute(&Day(25.0, 4)), Some(24.0));
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
    alpha: f64,
    phase: EmaPhase,
    current: Option<Price>,
    last_open_time: Option<Timestamp>,
    cur_close: Option<Price>,
    prev_close: Option<Price>,
}

impl Indicator for Ema {
    type Config = EmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let seed = SmaConfig::builder()
            .length(NonZero::new(config.length).expect("EmaConfig length is non-zero"))
            .source(config.source)
            .build();

        Self {
            config,
            alpha: config.alpha(),
            phase: EmaPhase::Seeding {
                sma: Sma::new(seed),
                seen_bars: 0,
            },
            current: None,
            last_open_time: None,
            cur_close: None,
            prev_close: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Price> {
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

            // Seed bar closed: switch to the recurrence.
            if let EmaPhase::Seeding { seen_bars, .. } = &self.phase
                && *seen_bars >= self.config.length
                && let Some(seed) = self.current
            {
                self.phase = EmaPhase::Active { previous: seed };
            } else if let EmaPhase::Active { previous } = &mut self.phase
                && let Some(closed) = self.current
            {
                *previous = closed;
            }
        }

        self.current = match &mut self.phase {
            EmaPhase::Seeding { sma, seen_bars } => {
                if is_next_bar {
                    *seen_bars += 1;
                }
                sma.compute(ohlcv)
            }
            EmaPhase::Active { previous } => {
                let price = self.config.source.extract(ohlcv, self.prev_close);
                Some(self.alpha.mul_add(price - *previous, *previous))
            }
        };
        self.cur_close = Some(ohlcv.close());

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({}, {})", self.config.length, self.config.source)
    }
}
