use crate::{Ohlcv, Price, PriceSource, Timestamp};
use std::collections::VecDeque;

/// Fixed-length trailing window of extracted prices.
///
/// Shared by the window-based indicators ([`Sma`](crate::Sma),
/// [`Bb`](crate::Bb)). Handles bar boundaries: a new `open_time` slides the
/// window, a repeated one replaces the newest entry.
#[derive(Clone, Debug)]
pub(crate) struct PriceWindow {
    size: usize,
    window: VecDeque<Price>,
    /// Close of the bar currently being built; becomes `prev_close` when the
    /// next bar opens. Needed by [`PriceSource::TrueRange`].
    cur_close: Option<Price>,
    prev_close: Option<Price>,
    source: PriceSource,
    last_open_time: Option<Timestamp>,
}

impl PriceWindow {
    pub fn new(size: usize, source: PriceSource) -> Self {
        Self {
            size,
            source,
            cur_close: None,
            prev_close: None,
            window: VecDeque::with_capacity(size),
            last_open_time: None,
        }
    }

    #[inline]
    pub fn add(&mut self, ohlcv: &impl Ohlcv) {
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

            if self.is_ready() {
                self.window.pop_front();
            }
        } else {
            self.window.pop_back();
        }

        let price = self.source.extract(ohlcv, self.prev_close);

        self.cur_close = Some(ohlcv.close());
        self.window.push_back(price);
    }

    /// Mean of the window, once it is full.
    ///
    /// Averages the offsets from the oldest price and adds it back, so a
    /// constant window averages to exactly that price whatever its length.
    #[inline]
    pub fn mean(&self) -> Option<Price> {
        let origin = self.origin()?;
        Some(origin + self.shifted_mean(origin))
    }

    /// Most recently added price, once the window is full.
    #[inline]
    pub fn latest(&self) -> Option<Price> {
        if self.is_ready() {
            self.window.back().copied()
        } else {
            None
        }
    }

    /// Population standard deviation of the window.
    ///
    /// Two passes over prices shifted by the oldest one, so a constant window
    /// has exactly zero deviation.
    #[inline]
    pub fn std_dev(&self) -> Option<f64> {
        let origin = self.origin()?;
        let shifted_mean = self.shifted_mean(origin);
        let squared: f64 = self
            .window
            .iter()
            .map(|price| {
                let deviation = price - origin - shifted_mean;
                deviation * deviation
            })
            .sum();

        Some((squared / self.divisor()).sqrt())
    }

    /// Oldest price, once the window is full.
    #[inline]
    fn origin(&self) -> Option<Price> {
        if self.is_ready() {
            self.window.front().copied()
        } else {
            None
        }
    }

    #[inline]
    fn shifted_mean(&self, origin: Price) -> f64 {
        self.window.iter().map(|price| price - origin).sum::<f64>() / self.divisor()
    }

    #[inline]
    #[allow(clippy::cast_precision_loss)]
    fn divisor(&self) -> f64 {
        self.size as f64
    }

    #[inline]
    fn is_ready(&self) -> bool {
        self.window.len() == self.size
    }
}
