use crate::{Ohlcv, Price};

use std::fmt::{Debug, Display};

/// Which price an indicator reads from each [`Ohlcv`] bar.
///
/// Every indicator config carries a `PriceSource`; the default is the close.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum PriceSource {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Closing price.
    #[default]
    Close,
    /// Lowest price.
    Low,
    /// Median price: `(high + low) / 2`.
    HL2,
    /// Typical price: `(high + low + close) / 3`.
    HLC3,
    /// Average price: `(open + high + low + close) / 4`.
    OHLC4,
    /// Weighted close: `(high + low + close + close) / 4`.
    HLCC4,
    /// True range: `max(high - low, |high - prev_close|, |low - prev_close|)`.
    ///
    /// Without a previous close this is `high - low`.
    TrueRange,
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl PriceSource {
    #[inline]
    pub(crate) fn extract(self, ohlcv: &impl Ohlcv, prev_close: Option<Price>) -> Price {
        match self {
            Self::Open => ohlcv.open(),
            Self::High => ohlcv.high(),
            Self::Close => ohlcv.close(),
            Self::Low => ohlcv.low(),
            Self::HL2 => f64::midpoint(ohlcv.high(), ohlcv.low()),
            Self::HLC3 => (ohlcv.high() + ohlcv.low() + ohlcv.close()) / 3.0,
            Self::OHLC4 => (ohlcv.open() + ohlcv.high() + ohlcv.low() + ohlcv.close()) / 4.0,
            Self::HLCC4 => (ohlcv.high() + ohlcv.low() + ohlcv.close() + ohlcv.close()) / 4.0,
            Self::TrueRange => true_range(ohlcv.high(), ohlcv.low(), prev_close),
        }
    }
}

/// Largest of the bar's own range and its gaps against the previous close.
#[inline]
pub(crate) fn true_range(high: Price, low: Price, prev_close: Option<Price>) -> Price {
    let range = high - low;

    match prev_close {
        Some(prev_close) => range
            .max((high - prev_close).abs())
            .max((low - prev_close).abs()),
        None => range,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{Kline, assert_approx};

    // open 10, high 30, low 5, close 20
    fn kline() -> Kline {
        Kline::new(10.0, 30.0, 5.0, 20.0)
    }

    mod single_prices {
        use super::*;

        #[test]
        fn raw_fields() {
            let k = kline();
            assert_eq!(PriceSource::Open.extract(&k, None), 10.0);
            assert_eq!(PriceSource::High.extract(&k, None), 30.0);
            assert_eq!(PriceSource::Low.extract(&k, None), 5.0);
            assert_eq!(PriceSource::Close.extract(&k, None), 20.0);
        }

        #[test]
        fn close_is_default() {
            assert_eq!(PriceSource::default(), PriceSource::Close);
        }

        #[test]
        fn prev_close_ignored_outside_true_range() {
            let k = kline();
            assert_eq!(PriceSource::Close.extract(&k, Some(99.0)), 20.0);
            assert_eq!(PriceSource::HL2.extract(&k, Some(99.0)), 17.5);
        }
    }

    mod composites {
        use super::*;

        #[test]
        fn hl2() {
            assert_eq!(PriceSource::HL2.extract(&kline(), None), 17.5);
        }

        #[test]
        fn hlc3() {
            // (30 + 5 + 20) / 3
            assert_approx!(PriceSource::HLC3.extract(&kline(), None), 55.0 / 3.0);
        }

        #[test]
        fn ohlc4() {
            assert_eq!(PriceSource::OHLC4.extract(&kline(), None), 16.25);
        }

        #[test]
        fn hlcc4() {
            assert_eq!(PriceSource::HLCC4.extract(&kline(), None), 18.75);
        }
    }

    mod true_range {
        use super::*;

        #[test]
        fn first_bar_is_high_minus_low() {
            assert_eq!(PriceSource::TrueRange.extract(&kline(), None), 25.0);
        }

        #[test]
        fn range_dominates_inside_bar() {
            assert_eq!(PriceSource::TrueRange.extract(&kline(), Some(15.0)), 25.0);
        }

        #[test]
        fn gap_up_measures_from_prev_close() {
            // |30 - (-10)| = 40
            assert_eq!(PriceSource::TrueRange.extract(&kline(), Some(-10.0)), 40.0);
        }

        #[test]
        fn gap_down_measures_from_prev_close() {
            // |5 - 50| = 45
            assert_eq!(PriceSource::TrueRange.extract(&kline(), Some(50.0)), 45.0);
        }

        #[test]
        fn helper_matches_extract() {
            assert_eq!(true_range(30.0, 5.0, Some(50.0)), 45.0);
            assert_eq!(true_range(30.0, 5.0, None), 25.0);
        }
    }

    #[test]
    fn display_uses_variant_name() {
        assert_eq!(PriceSource::OHLC4.to_string(), "OHLC4");
        assert_eq!(PriceSource::TrueRange.to_string(), "TrueRange");
    }
}
