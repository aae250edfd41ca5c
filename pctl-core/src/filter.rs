//! Moving-average filter
//!
//! Damps sensor noise before the safety loop compares readings against
//! their limits. Samples are integers in milli-units (mV, m°C, m%RH).

/// Window length shared by every safety filter
pub const WINDOW: usize = 10;

/// Fixed-window running mean over the last `N` samples
///
/// The mean is reported as soon as one sample has been pushed; until the
/// window fills it averages over the samples seen so far.
#[derive(Debug, Clone)]
pub struct MovingAverage<const N: usize = WINDOW> {
    samples: [i32; N],
    next: usize,
    filled: usize,
    sum: i64,
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MovingAverage<N> {
    /// Create an empty filter
    pub const fn new() -> Self {
        Self {
            samples: [0; N],
            next: 0,
            filled: 0,
            sum: 0,
        }
    }

    /// Push a sample and return the new mean
    pub fn update(&mut self, sample: i32) -> i32 {
        if N == 0 {
            return sample;
        }

        if self.filled == N {
            self.sum -= i64::from(self.samples[self.next]);
        } else {
            self.filled += 1;
        }

        self.samples[self.next] = sample;
        self.sum += i64::from(sample);
        self.next = (self.next + 1) % N;

        self.mean()
    }

    /// Current mean, or 0 before the first sample
    pub fn mean(&self) -> i32 {
        if self.filled == 0 {
            return 0;
        }
        (self.sum / self.filled as i64) as i32
    }

    /// Number of samples currently in the window
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Drop all samples
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_sample_is_mean() {
        let mut avg: MovingAverage<4> = MovingAverage::new();
        assert!(avg.is_empty());
        assert_eq!(avg.update(12_000), 12_000);
        assert_eq!(avg.len(), 1);
    }

    #[test]
    fn test_partial_window_averages_seen_samples() {
        let mut avg: MovingAverage<4> = MovingAverage::new();
        avg.update(10);
        assert_eq!(avg.update(20), 15);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut avg: MovingAverage<3> = MovingAverage::new();
        avg.update(100);
        avg.update(100);
        avg.update(100);
        // 100 drops out, window is [100, 100, 400]
        assert_eq!(avg.update(400), 200);
        assert_eq!(avg.len(), 3);
    }

    #[test]
    fn test_single_dip_is_damped() {
        let mut avg = MovingAverage::<WINDOW>::new();
        for _ in 0..WINDOW {
            avg.update(12_000);
        }
        let mean = avg.update(9_000);
        assert!(mean > 11_500);
    }

    #[test]
    fn test_reset() {
        let mut avg: MovingAverage<2> = MovingAverage::new();
        avg.update(5);
        avg.reset();
        assert_eq!(avg.mean(), 0);
        assert!(avg.is_empty());
    }

    proptest! {
        #[test]
        fn test_mean_within_window_extremes(samples in prop::collection::vec(-50_000i32..50_000, 1..40)) {
            let mut avg: MovingAverage<5> = MovingAverage::new();
            let mut mean = 0;
            for &s in &samples {
                mean = avg.update(s);
            }
            let start = samples.len().saturating_sub(5);
            let window = &samples[start..];
            let lo = *window.iter().min().unwrap();
            let hi = *window.iter().max().unwrap();
            prop_assert!(mean >= lo && mean <= hi);
        }
    }
}
