//! PID controller used for per-side wheel speed correction

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Optional bound on the magnitude of the integral accumulation
    i_max: Option<f64>,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            i_max: None,
            integral: 0f64,
            prev_error: None
        }
    }

    /// Bound the integral accumulation to `[-i_max, i_max]`.
    pub fn with_integral_limit(mut self, i_max: f64) -> Self {
        self.i_max = Some(i_max.abs());
        self
    }

    /// Clear the integral and previous error.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }

    /// Get the value of the controller for the given error, `dt_s` seconds
    /// after the previous call.
    ///
    /// A non-finite error gives zero output and leaves the integral and
    /// previous error untouched.
    pub fn get(&mut self, error: f64, dt_s: f64) -> f64 {
        if !error.is_finite() {
            return 0f64
        }

        // A non-positive (or NaN) dt is treated as no time having passed
        let dt = if dt_s > 0f64 { Some(dt_s) } else { None };

        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral
        self.integral += match dt {
            Some(t) => error * t,
            None => 0f64
        };

        if let Some(i_max) = self.i_max {
            self.integral = util::maths::clamp(self.integral, -i_max, i_max);
        }

        // Calculate the derivative.
        //
        // If there's no time difference again we assume no derivative, for the
        // same reasons as for integral.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            (None, Some(t)) => error / t,
            (_, None) => 0f64
        };

        // Calculate the output
        let out = 
            self.k_p * error 
            + self.k_i * self.integral 
            + self.k_d * deriv;
        
        // Remember the previous error
        self.prev_error = Some(error);

        out
    }

    /// Get the value of the controller driving `measurement` towards
    /// `setpoint`.
    pub fn calculate(&mut self, measurement: f64, setpoint: f64, dt_s: f64) -> f64 {
        self.get(setpoint - measurement, dt_s)
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_proportional() {
        let mut pid = PidController::new(2.464, 0.0, 0.0);
        assert_abs_diff_eq!(pid.calculate(1.0, 1.5, 0.02), 2.464 * 0.5, epsilon = 1e-12);
        assert_eq!(pid.calculate(2.0, 2.0, 0.02), 0.0);
    }

    #[test]
    fn test_integral_and_limit() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        pid.get(1.0, 0.5);
        pid.get(1.0, 0.5);
        assert_abs_diff_eq!(pid.integral(), 1.0, epsilon = 1e-12);

        let mut pid = PidController::new(0.0, 1.0, 0.0).with_integral_limit(0.25);
        for _ in 0..10 {
            pid.get(1.0, 0.5);
        }
        assert_abs_diff_eq!(pid.get(1.0, 0.5), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_no_dt_no_update() {
        let mut pid = PidController::new(0.0, 1.0, 1.0);

        assert_eq!(pid.get(3.0, 0.0), 0.0);
        assert_eq!(pid.get(3.0, -0.1), 0.0);
        assert_eq!(pid.get(3.0, std::f64::NAN), 0.0);
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn test_non_finite_error_not_stored() {
        let mut pid = PidController::new(1.0, 1.0, 1.0);
        pid.get(1.0, 0.1);

        assert_eq!(pid.get(std::f64::NAN, 0.1), 0.0);
        assert_eq!(pid.get(std::f64::INFINITY, 0.1), 0.0);
        assert_abs_diff_eq!(pid.integral(), 0.1, epsilon = 1e-12);

        // Derivative is taken against the last finite error
        assert_abs_diff_eq!(pid.get(1.0, 0.1), 1.0 + 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_derivative_and_reset() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);
        pid.get(1.0, 0.1);
        assert_abs_diff_eq!(pid.get(1.5, 0.1), 5.0, epsilon = 1e-9);

        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_abs_diff_eq!(pid.get(0.2, 0.1), 2.0, epsilon = 1e-9);
    }
}
