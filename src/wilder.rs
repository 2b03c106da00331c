/// Wilder's running average: an SMA seed over the first `length` samples,
/// then `avg = (prev_avg × (length − 1) + sample) / length`.
///
/// Shared by [`Rsi`](crate::Rsi) (average gain and loss) and
/// [`Atr`](crate::Atr) (true range). The caller decides what a sample is and
/// whether it starts a new bar; a sample for the same bar replaces the
/// previous one.
#[derive(Clone, Debug)]
pub(crate) struct WilderAverage {
    length: usize,
    divisor: f64,
    length_minus_one: f64,
    phase: Phase,
}

#[derive(Clone, Debug)]
enum Phase {
    Seeding {
        sum: f64,
        /// Sample of the newest bar, backed out of `sum` on repaint.
        latest: f64,
        samples: usize,
    },
    Smoothing {
        /// Average as of the last closed bar.
        previous: f64,
        current: f64,
    },
}

impl WilderAverage {
    pub(crate) fn new(length: usize) -> Self {
        debug_assert!(length > 0, "length must be non-zero");

        Self {
            length,
            #[allow(clippy::cast_precision_loss)]
            divisor: length as f64,
            #[allow(clippy::cast_precision_loss)]
            length_minus_one: (length - 1) as f64,
            phase: Phase::Seeding {
                sum: 0.0,
                latest: 0.0,
                samples: 0,
            },
        }
    }

    /// Feeds one sample and returns the average, or `None` while fewer than
    /// `length` samples have been seen.
    ///
    /// The first call must open a bar (`is_next_bar == true`).
    #[inline]
    pub(crate) fn update(&mut self, sample: f64, is_next_bar: bool) -> Option<f64> {
        let (length, divisor, length_minus_one) =
            (self.length, self.divisor, self.length_minus_one);

        match &mut self.phase {
            Phase::Seeding {
                sum,
                latest,
                samples,
            } => {
                if is_next_bar && *samples == length {
                    let seed = *sum / divisor;
                    let current = seed.mul_add(length_minus_one, sample) / divisor;
                    self.phase = Phase::Smoothing {
                        previous: seed,
                        current,
                    };
                    return Some(current);
                }

                if is_next_bar {
                    *samples += 1;
                    *latest = 0.0;
                }
                *sum += sample - *latest;
                *latest = sample;

                (*samples == length).then(|| *sum / divisor)
            }
            Phase::Smoothing { previous, current } => {
                if is_next_bar {
                    *previous = *current;
                }
                *current = previous.mul_add(length_minus_one, sample) / divisor;
                Some(*current)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn none_until_length_samples() {
        let mut avg = WilderAverage::new(3);
        assert_eq!(avg.update(1.0, true), None);
        assert_eq!(avg.update(2.0, true), None);
        assert_eq!(avg.update(3.0, true), Some(2.0));
    }

    #[test]
    fn smooths_after_seed() {
        let mut avg = WilderAverage::new(3);
        avg.update(1.0, true);
        avg.update(2.0, true);
        avg.update(3.0, true); // seed 2
        // (2 × 2 + 5) / 3 = 3
        assert_eq!(avg.update(5.0, true), Some(3.0));
        // (3 × 2 + 0) / 3 = 2
        assert_eq!(avg.update(0.0, true), Some(2.0));
    }

    #[test]
    fn repaint_during_seed_replaces_sample() {
        let mut avg = WilderAverage::new(2);
        avg.update(4.0, true);
        avg.update(10.0, true);
        assert_eq!(avg.update(6.0, false), Some(5.0));
        assert_eq!(avg.update(8.0, false), Some(6.0));
    }

    #[test]
    fn repaint_while_smoothing_keeps_previous() {
        let mut avg = WilderAverage::new(2);
        avg.update(2.0, true);
        avg.update(4.0, true); // seed 3
        assert_eq!(avg.update(5.0, true), Some(4.0)); // (3 + 5) / 2
        assert_eq!(avg.update(9.0, false), Some(6.0)); // (3 + 9) / 2
        assert_eq!(avg.update(1.0, true), Some(3.5)); // (6 + 1) / 2
    }

    #[test]
    fn length_one_follows_samples() {
        let mut avg = WilderAverage::new(1);
        assert_eq!(avg.update(7.0, true), Some(7.0));
        assert_eq!(avg.update(3.0, true), Some(3.0));
        assert_eq!(avg.update(4.0, false), Some(4.0));
    }
}
