//! Signal Filtering
//!
//! Provides a simple low-pass filter used to smooth derivative and
//! cooling-rate estimates before they reach the PID controller.

use num_traits::Float;

/// A generic trait for signal filters.
pub trait Filter<T> {
    /// Adds a new sample to the filter.
    fn add_sample(&mut self, sample: T);
    /// Returns the current filtered output value.
    fn output(&self) -> T;
}

/// A simple first-order low-pass filter.
///
/// This filter smooths out a signal by giving more weight to recent samples.
/// The `alpha` value determines the responsiveness vs. smoothness trade-off.
/// `output = alpha * new_sample + (1 - alpha) * old_output`
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LowPassFilter<T: Float> {
    alpha: T,
    last_output: T,
}

impl<T: Float> LowPassFilter<T> {
    /// Creates a new `LowPassFilter`.
    ///
    /// # Arguments
    /// * `alpha` - The smoothing factor, between 0.0 and 1.0.
    ///   - A smaller alpha results in more smoothing but slower response.
    ///   - A larger alpha results in less smoothing but faster response.
    /// * `initial_value` - The initial output value of the filter.
    pub fn new(alpha: T, initial_value: T) -> Self {
        assert!(alpha >= T::zero() && alpha <= T::one());
        Self {
            alpha,
            last_output: initial_value,
        }
    }
}

impl<T: Float> Filter<T> for LowPassFilter<T> {
    fn add_sample(&mut self, sample: T) {
        self.last_output = self.alpha * sample + (T::one() - self.alpha) * self.last_output;
    }

    fn output(&self) -> T {
        self.last_output
    }
}
