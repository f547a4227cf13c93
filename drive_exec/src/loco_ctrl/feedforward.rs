//! Permanent magnet DC motor feedforward

use serde::Serialize;
use util::maths::sign;

/// Open loop voltage model `V = k_s * sign(v) + k_v * v + k_a * a`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SimpleMotorFeedforward {
    /// Static friction voltage
    ///
    /// Units: volts
    pub k_s: f64,

    /// Units: volts/(meters/second)
    pub k_v: f64,

    /// Units: volts/(meters/second^2)
    pub k_a: f64
}

impl SimpleMotorFeedforward {
    pub fn new(k_s: f64, k_v: f64, k_a: f64) -> Self {
        Self { k_s, k_v, k_a }
    }

    /// Voltage needed to hold velocity `v_ms` while accelerating at `a_mss`.
    ///
    /// No static friction term is applied at zero velocity.
    pub fn calculate(&self, v_ms: f64, a_mss: f64) -> f64 {
        self.k_s * sign(v_ms) + self.k_v * v_ms + self.k_a * a_mss
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_calculate() {
        let ff = SimpleMotorFeedforward::new(0.7409, 2.1937, 0.17827);

        assert_eq!(ff.calculate(0.0, 0.0), 0.0);
        assert_abs_diff_eq!(ff.calculate(2.0, 0.0), 0.7409 + 2.0 * 2.1937, epsilon = 1e-12);
        assert_abs_diff_eq!(
            ff.calculate(-1.0, 0.5), 
            -0.7409 - 2.1937 + 0.5 * 0.17827, 
            epsilon = 1e-12
        );
    }
}
