//! Composite trend scoring.
//!
//! [`TrendScorer`] runs RSI, MACD, Bollinger Bands, two SMAs and ATR across a
//! bar history, classifies the latest values into five sub-signals and sums
//! their weights into one [`TrendScore`].

use std::num::NonZero;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    Atr, AtrConfig, Bar, Bb, BbConfig, BbValue, Macd, MacdConfig, MacdValue, Price, Rsi,
    RsiConfig, Sma, SmaConfig, TrendSignal, ohlcv::Sequenced,
};

const SUB_SIGNALS: u8 = 5;

/// Parameters of a [`TrendScorer`].
///
/// # Example
///
/// ```
/// use trendscore::TrendConfig;
/// use std::num::NonZero;
///
/// let config = TrendConfig::builder()
///     .rsi_length(NonZero::new(21).unwrap())
///     .min_bars(30)
///     .build();
///
/// assert_eq!(config.rsi().length(), 21);
/// assert_eq!(config.sma_long().length(), 50);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct TrendConfig {
    rsi: RsiConfig,
    macd: MacdConfig,
    bollinger: BbConfig,
    sma_short: SmaConfig,
    sma_long: SmaConfig,
    atr: AtrConfig,
    min_bars: usize,
}

impl TrendConfig {
    #[must_use]
    pub fn builder() -> TrendConfigBuilder {
        TrendConfigBuilder::new()
    }

    #[must_use]
    pub fn rsi(&self) -> RsiConfig {
        self.rsi
    }

    #[must_use]
    pub fn macd(&self) -> MacdConfig {
        self.macd
    }

    #[must_use]
    pub fn bollinger(&self) -> BbConfig {
        self.bollinger
    }

    #[must_use]
    pub fn sma_short(&self) -> SmaConfig {
        self.sma_short
    }

    #[must_use]
    pub fn sma_long(&self) -> SmaConfig {
        self.sma_long
    }

    #[must_use]
    pub fn atr(&self) -> AtrConfig {
        self.atr
    }

    /// Histories shorter than this are not scored.
    #[must_use]
    pub fn min_bars(&self) -> usize {
        self.min_bars
    }
}

impl Default for TrendConfig {
    /// RSI(14), MACD(12, 26, 9), BB(20, 2σ), SMA 20/50, ATR(14), 10 bars
    /// minimum.
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`TrendConfig`]. Every field starts at its
/// [`Default`](TrendConfig::default) value.
pub struct TrendConfigBuilder {
    rsi_length: NonZero<usize>,
    macd: MacdConfig,
    bollinger: BbConfig,
    sma_short_length: NonZero<usize>,
    sma_long_length: NonZero<usize>,
    atr_length: NonZero<usize>,
    min_bars: usize,
}

impl TrendConfigBuilder {
    fn new() -> Self {
        Self {
            rsi_length: NonZero::<usize>::MIN.saturating_add(13),
            macd: MacdConfig::default_12_26_9(),
            bollinger: BbConfig::default_20(),
            sma_short_length: NonZero::<usize>::MIN.saturating_add(19),
            sma_long_length: NonZero::<usize>::MIN.saturating_add(49),
            atr_length: NonZero::<usize>::MIN.saturating_add(13),
            min_bars: 10,
        }
    }

    #[must_use]
    pub fn rsi_length(mut self, length: NonZero<usize>) -> Self {
        self.rsi_length = length;
        self
    }

    #[must_use]
    pub fn macd(mut self, config: MacdConfig) -> Self {
        self.macd = config;
        self
    }

    #[must_use]
    pub fn bollinger(mut self, config: BbConfig) -> Self {
        self.bollinger = config;
        self
    }

    #[must_use]
    pub fn sma_short_length(mut self, length: NonZero<usize>) -> Self {
        self.sma_short_length = length;
        self
    }

    #[must_use]
    pub fn sma_long_length(mut self, length: NonZero<usize>) -> Self {
        self.sma_long_length = length;
        self
    }

    #[must_use]
    pub fn atr_length(mut self, length: NonZero<usize>) -> Self {
        self.atr_length = length;
        self
    }

    /// Minimum history length. Zero still rejects an empty history.
    #[must_use]
    pub fn min_bars(mut self, min_bars: usize) -> Self {
        self.min_bars = min_bars;
        self
    }

    /// # Panics
    ///
    /// Panics if the short SMA is not shorter than the long one.
    #[must_use]
    pub fn build(self) -> TrendConfig {
        assert!(
            self.sma_short_length < self.sma_long_length,
            "short SMA length must be less than long SMA length: short={}, long={}",
            self.sma_short_length,
            self.sma_long_length,
        );

        TrendConfig {
            rsi: RsiConfig::close(self.rsi_length),
            macd: self.macd,
            bollinger: self.bollinger,
            sma_short: SmaConfig::close(self.sma_short_length),
            sma_long: SmaConfig::close(self.sma_long_length),
            atr: AtrConfig::new(self.atr_length),
            min_bars: self.min_bars,
        }
    }
}

/// Composite buy/sell assessment of a bar history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendScore {
    pub signal: TrendSignal,
    /// Sum of the weights of the defined sub-signals, in `-10..=10`.
    pub score: i32,
    /// Share of the five sub-signals that could be computed, in percent.
    /// Always a multiple of 20.
    pub confidence: u8,
    pub details: TrendDetails,
    pub indicators: IndicatorSnapshot,
}

impl TrendScore {
    /// The score of a history too short to assess: neutral, zero confidence,
    /// nothing computed.
    #[must_use]
    pub fn insufficient_data() -> Self {
        Self {
            signal: TrendSignal::Neutral,
            score: 0,
            confidence: 0,
            details: TrendDetails::default(),
            indicators: IndicatorSnapshot::default(),
        }
    }
}

/// Per-indicator classification. `None` where the indicator had not warmed
/// up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDetails {
    pub rsi: Option<TrendSignal>,
    pub macd: Option<TrendSignal>,
    pub bollinger: Option<TrendSignal>,
    pub moving_average: Option<TrendSignal>,
    pub momentum: Option<TrendSignal>,
}

impl TrendDetails {
    fn iter(&self) -> impl Iterator<Item = TrendSignal> {
        [
            self.rsi,
            self.macd,
            self.bollinger,
            self.moving_average,
            self.momentum,
        ]
        .into_iter()
        .flatten()
    }
}

/// Latest indicator values, rounded for display.
///
/// RSI to 1 decimal; MACD line, signal and histogram to 3; SMAs, %B, ATR %
/// and momentum to 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub percent_b: Option<f64>,
    /// ATR as a percentage of the last close.
    pub atr_percent: Option<f64>,
    /// One-bar percent change of the close.
    pub momentum: Option<f64>,
}

/// Scores bar histories with a fixed [`TrendConfig`].
///
/// # Example
///
/// ```
/// use trendscore::{Bar, TrendScorer, TrendConfig, TrendSignal};
///
/// let bars: Vec<Bar> = (0..60)
///     .map(|i| {
///         let close = 100.0 + (i % 7) as f64;
///         Bar {
///             date: format!("2024-01-{:02}", i % 28 + 1),
///             open: close,
///             high: close + 1.0,
///             low: close - 1.0,
///             close,
///             volume: 0.0,
///         }
///     })
///     .collect();
///
/// let score = TrendScorer::new(TrendConfig::default()).score(&bars);
///
/// assert_eq!(score.confidence, 100);
/// assert_eq!(score.confidence % 20, 0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TrendScorer {
    config: TrendConfig,
}

impl TrendScorer {
    #[must_use]
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Scores `bars`, oldest first.
    ///
    /// Histories shorter than [`TrendConfig::min_bars`] (and empty ones)
    /// give [`TrendScore::insufficient_data`].
    #[must_use]
    pub fn score(&self, bars: &[Bar]) -> TrendScore {
        if bars.is_empty() || bars.len() < self.config.min_bars {
            debug!(
                bars = bars.len(),
                min_bars = self.config.min_bars,
                "history too short for a trend score"
            );
            return TrendScore::insufficient_data();
        }

        let latest = Latest::scan(&self.config, bars);
        let momentum = latest.momentum();

        let details = TrendDetails {
            rsi: latest.rsi.map(rsi_signal),
            macd: latest
                .macd
                .and_then(|value| value.histogram())
                .map(|histogram| macd_signal(histogram, latest.prev_histogram)),
            bollinger: latest.bands.map(|bands| bollinger_signal(bands.percent_b())),
            moving_average: moving_average_signal(latest.close, latest.sma_short, latest.sma_long),
            momentum: momentum.map(momentum_signal),
        };
        trace!(?details, "sub-signals");

        let count = details.iter().count();
        let score = details.iter().map(TrendSignal::weight).sum();
        let signal = TrendSignal::from_score(score);
        #[allow(clippy::cast_possible_truncation)]
        let confidence = (count as u8) * (100 / SUB_SIGNALS);

        debug!(
            bars = bars.len(),
            %signal,
            score,
            confidence,
            "trend scored"
        );

        TrendScore {
            signal,
            score,
            confidence,
            details,
            indicators: latest.snapshot(momentum),
        }
    }
}

/// Scores `bars` with [`TrendConfig::default`].
#[must_use]
pub fn compute_trend_score(bars: &[Bar]) -> TrendScore {
    TrendScorer::default().score(bars)
}

/// Indicator values as of the last bar.
struct Latest {
    rsi: Option<Price>,
    macd: Option<MacdValue>,
    /// Histogram of the second-to-last bar.
    prev_histogram: Option<f64>,
    bands: Option<BbValue>,
    sma_short: Option<Price>,
    sma_long: Option<Price>,
    atr: Option<Price>,
    close: Price,
    prev_close: Option<Price>,
}

impl Latest {
    fn scan(config: &TrendConfig, bars: &[Bar]) -> Self {
        let mut rsi = Rsi::new(config.rsi);
        let mut macd = Macd::new(config.macd);
        let mut bollinger = Bb::new(config.bollinger);
        let mut sma_short = Sma::new(config.sma_short);
        let mut sma_long = Sma::new(config.sma_long);
        let mut atr = Atr::new(config.atr);
        let mut prev_histogram = None;

        for (index, bar) in bars.iter().enumerate() {
            let bar = Sequenced::new(index, bar);
            prev_histogram = macd.histogram();

            rsi.compute(&bar);
            macd.compute(&bar);
            bollinger.compute(&bar);
            sma_short.compute(&bar);
            sma_long.compute(&bar);
            atr.compute(&bar);
        }

        let mut closes = bars.iter().rev().map(|bar| bar.close);

        Self {
            rsi: rsi.value(),
            macd: macd.value(),
            prev_histogram,
            bands: bollinger.value(),
            sma_short: sma_short.value(),
            sma_long: sma_long.value(),
            atr: atr.value(),
            close: closes.next().unwrap_or_default(),
            prev_close: closes.next(),
        }
    }

    /// One-bar percent change; zero when the previous close is not positive.
    fn momentum(&self) -> Option<f64> {
        self.prev_close.map(|prev_close| {
            if prev_close > 0.0 {
                (self.close - prev_close) / prev_close * 100.0
            } else {
                0.0
            }
        })
    }

    fn snapshot(&self, momentum: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: self.rsi.map(|rsi| round(rsi, 1)),
            macd: self.macd.map(|value| round(value.macd(), 3)),
            macd_signal: self
                .macd
                .and_then(|value| value.signal())
                .map(|signal| round(signal, 3)),
            macd_histogram: self
                .macd
                .and_then(|value| value.histogram())
                .map(|histogram| round(histogram, 3)),
            sma_short: self.sma_short.map(|sma| round(sma, 2)),
            sma_long: self.sma_long.map(|sma| round(sma, 2)),
            percent_b: self.bands.map(|bands| round(bands.percent_b(), 2)),
            atr_percent: self
                .atr
                .filter(|_| self.close > 0.0)
                .map(|atr| round(atr / self.close * 100.0, 2)),
            momentum: momentum.map(|momentum| round(momentum, 2)),
        }
    }
}

fn rsi_signal(rsi: f64) -> TrendSignal {
    if rsi < 30.0 {
        TrendSignal::StrongBuy
    } else if rsi < 45.0 {
        TrendSignal::Buy
    } else if rsi > 70.0 {
        TrendSignal::StrongSell
    } else if rsi > 55.0 {
        TrendSignal::Sell
    } else {
        TrendSignal::Neutral
    }
}

/// Histogram zero crosses are strong signals; a missing previous histogram
/// counts as zero.
fn macd_signal(histogram: f64, prev_histogram: Option<f64>) -> TrendSignal {
    let prev = prev_histogram.unwrap_or(0.0);

    if histogram > 0.0 && prev <= 0.0 {
        TrendSignal::StrongBuy
    } else if histogram > 0.0 {
        TrendSignal::Buy
    } else if histogram < 0.0 && prev >= 0.0 {
        TrendSignal::StrongSell
    } else if histogram < 0.0 {
        TrendSignal::Sell
    } else {
        TrendSignal::Neutral
    }
}

fn bollinger_signal(percent_b: f64) -> TrendSignal {
    if percent_b < 0.0 {
        TrendSignal::StrongBuy
    } else if percent_b < 0.25 {
        TrendSignal::Buy
    } else if percent_b > 1.0 {
        TrendSignal::StrongSell
    } else if percent_b > 0.75 {
        TrendSignal::Sell
    } else {
        TrendSignal::Neutral
    }
}

fn moving_average_signal(
    close: Price,
    short: Option<Price>,
    long: Option<Price>,
) -> Option<TrendSignal> {
    match (short, long) {
        (Some(short), Some(long)) => {
            let above_short = close > short;
            let above_long = close > long;
            let golden_cross = short > long;

            Some(match (above_short, above_long) {
                (true, true) if golden_cross => TrendSignal::StrongBuy,
                (true, true) => TrendSignal::Buy,
                (false, false) if !golden_cross => TrendSignal::StrongSell,
                (false, false) => TrendSignal::Sell,
                _ => TrendSignal::Neutral,
            })
        }
        (Some(short), None) if close > short => Some(TrendSignal::Buy),
        (Some(_), None) => Some(TrendSignal::Sell),
        (None, _) => None,
    }
}

fn momentum_signal(momentum: f64) -> TrendSignal {
    if momentum > 3.0 {
        TrendSignal::StrongBuy
    } else if momentum > 0.5 {
        TrendSignal::Buy
    } else if momentum < -3.0 {
        TrendSignal::StrongSell
    } else if momentum < -0.5 {
        TrendSignal::Sell
    } else {
        TrendSignal::Neutral
    }
}

/// Half away from zero. Values that round to zero come out as `+0.0`.
fn round(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale + 0.0
}
