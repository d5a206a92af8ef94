//! A PID controller for a two-body system: a primary process variable (e.g.
//! chamber temperature) driven by an actuator whose own temperature (e.g. a
//! heater element) is a separate constraint.
//!
//! Beyond textbook PID, this controller adds:
//! - anti-windup on the integral accumulator,
//! - derivative-on-measurement with low-pass filtering,
//! - a predictive term that reacts to a fast-falling process variable before
//!   the plain proportional error would,
//! - a two-phase ceiling on the actuator's own temperature that scales the
//!   output down smoothly as the actuator approaches its limit instead of
//!   cutting it off abruptly.

use crate::filter::{Filter, LowPassFilter};
use num_traits::{Float, Signed};

/// Proportional/integral/derivative gains.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PidGains<F: Float> {
    pub kp: F,
    pub ki: F,
    pub kd: F,
}

impl<F: Float> PidGains<F> {
    pub const fn new(kp: F, ki: F, kd: F) -> Self {
        Self { kp, ki, kd }
    }
}

/// Configuration for the two-phase actuator-temperature ceiling.
///
/// `approach_margin` is the process-variable-to-setpoint gap under which the
/// controller switches from an aggressive (configured maximum) ceiling to a
/// conservative one (`setpoint + overshoot`), interpolating linearly between
/// the two as the gap shrinks. `actuator_slowdown_margin` is the separate
/// margin, measured on the actuator's own temperature, over which the output
/// is scaled down as the actuator approaches its ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaterCeiling<F: Float> {
    pub approach_margin: F,
    pub overshoot: F,
    pub actuator_slowdown_margin: F,
}

impl<F: Float> HeaterCeiling<F> {
    pub const fn new(approach_margin: F, overshoot: F, actuator_slowdown_margin: F) -> Self {
        Self {
            approach_margin,
            overshoot,
            actuator_slowdown_margin,
        }
    }
}

/// A PID controller regulating a process variable via an actuator whose own
/// temperature is bounded by a dynamic, two-phase ceiling.
#[derive(Debug, Clone, Copy)]
pub struct Pid<F: Float + Signed> {
    gains: PidGains<F>,
    output_min: F,
    output_max: F,
    max_allowed_temp: F,
    ceiling: HeaterCeiling<F>,

    integral: F,
    last_process_value: F,
    last_output: F,
    derivative: LowPassFilter<F>,
    cooling_rate: LowPassFilter<F>,
    last_time_ms: u64,
    first_run: bool,
    predictive_cooling: bool,
}

impl<F: Float + Signed> Pid<F> {
    /// Creates a new controller. `max_allowed_temp` is the outer (aggressive)
    /// actuator ceiling used when the process variable is far below setpoint.
    pub fn new(
        gains: PidGains<F>,
        output_min: F,
        output_max: F,
        max_allowed_temp: F,
        ceiling: HeaterCeiling<F>,
    ) -> Self {
        let filter_alpha = F::from(0.7).unwrap();
        Self {
            gains,
            output_min,
            output_max,
            max_allowed_temp,
            ceiling,
            integral: F::zero(),
            last_process_value: F::zero(),
            last_output: F::zero(),
            derivative: LowPassFilter::new(filter_alpha, F::zero()),
            cooling_rate: LowPassFilter::new(filter_alpha, F::zero()),
            last_time_ms: 0,
            first_run: true,
            predictive_cooling: true,
        }
    }

    /// Enables or disables the predictive-cooling boost (step 2 of
    /// [`Pid::compute`]). Exposed mainly so tests can compare a run against a
    /// control run with prediction disabled; production code should leave
    /// this enabled.
    pub fn set_predictive_cooling_enabled(&mut self, enabled: bool) {
        self.predictive_cooling = enabled;
    }

    /// Computes the next bounded output.
    ///
    /// `process_value` is the primary controlled temperature (e.g. chamber),
    /// `actuator_value` is the actuator's own temperature (e.g. heater),
    /// `now_ms` is the current monotonic time. The first call only records
    /// state and returns zero; a `now_ms` that hasn't advanced since the
    /// last call returns the previous output unchanged.
    pub fn compute(&mut self, setpoint: F, process_value: F, actuator_value: F, now_ms: u64) -> F {
        if self.first_run {
            self.first_run = false;
            self.last_process_value = process_value;
            self.last_time_ms = now_ms;
            self.last_output = F::zero();
            return F::zero();
        }

        if now_ms <= self.last_time_ms {
            return self.last_output;
        }
        let dt = F::from(now_ms - self.last_time_ms).unwrap() / F::from(1000.0).unwrap();

        // 1. Filtered cooling rate of the process variable.
        let raw_rate = (process_value - self.last_process_value) / dt;
        self.cooling_rate.add_sample(raw_rate);
        let cooling_rate = self.cooling_rate.output();

        // 2. Baseline error, boosted by a predictive term when cooling fast.
        let mut error = setpoint - process_value;
        let cooling_threshold = F::from(-0.08).unwrap();
        if self.predictive_cooling && cooling_rate < cooling_threshold {
            let horizon = F::from(10.0).unwrap();
            let predicted_value = process_value + cooling_rate * horizon;
            let predicted_error = setpoint - predicted_value;
            if predicted_error > error {
                let boost = F::from(1.5).unwrap();
                error = error + (predicted_error - error) * boost;
            }
        }

        // 3. Proportional term.
        let p_term = self.gains.kp * error;

        // 4. Integral term with anti-windup.
        let candidate = self.integral + self.gains.ki * error * dt;
        let saturating_high = (p_term + candidate) > self.output_max && error > F::zero();
        let saturating_low = (p_term + candidate) < self.output_min && error < F::zero();
        if !(saturating_high || saturating_low) {
            self.integral = candidate;
        }
        self.integral = self.integral.max(self.output_min).min(self.output_max);
        let i_term = self.integral;

        // 5. Derivative on measurement, low-pass filtered.
        let raw_derivative = -self.gains.kd * (process_value - self.last_process_value) / dt;
        self.derivative.add_sample(raw_derivative);
        let d_term = self.derivative.output();

        // 6. Sum and clamp.
        let mut output = (p_term + i_term + d_term)
            .max(self.output_min)
            .min(self.output_max);

        // 7. Two-phase actuator ceiling.
        let ceiling = self.dynamic_ceiling(setpoint, process_value);
        if actuator_value >= ceiling {
            output = F::zero();
            self.integral = F::zero();
        } else {
            let gap = ceiling - actuator_value;
            if gap < self.ceiling.actuator_slowdown_margin {
                let scale = gap / self.ceiling.actuator_slowdown_margin;
                output = output * scale;
                self.integral = self.integral * scale;
            }
        }

        self.last_process_value = process_value;
        self.last_time_ms = now_ms;
        self.last_output = output;
        output
    }

    /// The dynamic actuator ceiling for the current (setpoint, process_value)
    /// pair, exposed so callers (e.g. a safety monitor) can use the same
    /// bound the controller is using without duplicating the interpolation.
    pub fn dynamic_ceiling(&self, setpoint: F, process_value: F) -> F {
        let box_error = setpoint - process_value;
        let margin = self.ceiling.approach_margin;
        let conservative = setpoint + self.ceiling.overshoot;
        if box_error > margin {
            self.max_allowed_temp
        } else if box_error > F::zero() {
            let ratio = box_error / margin;
            conservative + (self.max_allowed_temp - conservative) * ratio
        } else {
            conservative
        }
    }

    /// Resets integral, derivative, cooling-rate state and re-arms the
    /// first-run behavior.
    pub fn reset(&mut self) {
        let filter_alpha = F::from(0.7).unwrap();
        self.integral = F::zero();
        self.last_process_value = F::zero();
        self.last_output = F::zero();
        self.derivative = LowPassFilter::new(filter_alpha, F::zero());
        self.cooling_rate = LowPassFilter::new(filter_alpha, F::zero());
        self.first_run = true;
    }

    pub fn set_gains(&mut self, gains: PidGains<F>) {
        self.gains = gains;
    }

    pub fn gains(&self) -> PidGains<F> {
        self.gains
    }

    /// Sets the output bounds, clamping `max` to `hard_max` if it would
    /// exceed it.
    pub fn set_limits(&mut self, min: F, max: F, hard_max: F) {
        self.output_min = min;
        self.output_max = if max > hard_max { hard_max } else { max };
    }

    pub fn set_max_allowed_temp(&mut self, max_allowed_temp: F) {
        self.max_allowed_temp = max_allowed_temp;
    }

    pub fn max_allowed_temp(&self) -> F {
        self.max_allowed_temp
    }

    /// Replaces the two-phase ceiling configuration, e.g. when the active
    /// preset's overshoot allowance changes.
    pub fn set_ceiling(&mut self, ceiling: HeaterCeiling<F>) {
        self.ceiling = ceiling;
    }

    pub fn ceiling(&self) -> HeaterCeiling<F> {
        self.ceiling
    }
}
