//! Technical-analysis indicators and a composite buy/sell trend score.
//!
//! Three layers, each built on the one before:
//!
//! - Streaming indicators ([`Sma`], [`Ema`], [`Rsi`], [`Bb`], [`Macd`],
//!   [`Atr`]) accept any type implementing [`Ohlcv`] one bar at a time and
//!   return `None` until warmed up. A bar with the same `open_time` as the
//!   previous one repaints it.
//! - [`series`] runs them over a whole history and returns index-aligned
//!   `Vec<Option<_>>` outputs.
//! - [`TrendScorer`] reads the latest values over a [`Bar`] history and
//!   classifies them into a [`TrendScore`].
//!
//! Each indicator type exposes [`new`](Sma::new), [`compute`](Sma::compute),
//! and [`value`](Sma::value) as inherent methods, so no trait import is
//! needed. Import [`Indicator`] only for generic code.
//!
//! ```
//! use trendscore::{Bar, TrendSignal, compute_trend_score};
//!
//! let bars: Vec<Bar> = serde_json::from_str(r#"[
//!     {"date": "2024-05-01", "open": 10.0, "high": 10.5, "low": 9.5, "close": 10.0, "volume": 1200},
//!     {"date": "2024-05-02", "open": 10.0, "high": 10.8, "low": 9.9, "close": 10.6, "volume": 900}
//! ]"#).unwrap();
//!
//! // Too short to assess with the default ten-bar minimum.
//! let score = compute_trend_score(&bars);
//! assert_eq!(score.signal, TrendSignal::Neutral);
//! assert_eq!(score.confidence, 0);
//! ```

mod atr;
mod bb;
mod ema;
mod indicator;
mod macd;
mod ohlcv;
mod price_source;
mod price_window;
mod rsi;
pub mod series;
mod signal;
mod sma;
mod trend;
mod wilder;

pub use crate::indicator::{Indicator, IndicatorConfig, IndicatorConfigBuilder};
pub use crate::ohlcv::{Bar, Ohlcv, Price, Timestamp};
pub use crate::price_source::PriceSource;

pub use crate::atr::{Atr, AtrConfig, AtrConfigBuilder};
pub use crate::bb::{Bb, BbConfig, BbConfigBuilder, BbValue, StdDev};
pub use crate::ema::{Ema, EmaConfig, EmaConfigBuilder};
pub use crate::macd::{Macd, MacdConfig, MacdConfigBuilder, MacdValue};
pub use crate::rsi::{Rsi, RsiConfig, RsiConfigBuilder};
pub use crate::sma::{Sma, SmaConfig, SmaConfigBuilder};

pub use crate::signal::{SignalStyle, TrendSignal};
pub use crate::trend::{
    IndicatorSnapshot, TrendConfig, TrendConfigBuilder, TrendDetails, TrendScore, TrendScorer,
    compute_trend_score,
};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute`].
            #[inline]
            pub fn compute(&mut self, kline: &impl Ohlcv) -> Option<$output> {
                <Self as Indicator>::compute(self, kline)
            }

            /// See [`Indicator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> Option<$output> {
                <Self as Indicator>::value(self)
            }
        }
    };
}

impl_indicator_methods!(Sma, SmaConfig, Price);
impl_indicator_methods!(Ema, EmaConfig, Price);
impl_indicator_methods!(Rsi, RsiConfig, Price);
impl_indicator_methods!(Bb, BbConfig, BbValue);
impl_indicator_methods!(Macd, MacdConfig, MacdValue);
impl_indicator_methods!(Atr, AtrConfig, Price);

#[cfg(test)]
mod test_util;
