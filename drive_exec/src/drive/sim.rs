//! Simulated drivetrain
//!
//! Each side is modelled as a first order DC motor with static friction:
//!
//! ```text
//! dv/dt = (V - k_s * sign(v) - k_v * v) / k_a
//! ```
//!
//! which is the inverse of the feedforward model, so a correctly tuned
//! feedforward drives the simulation exactly along its profile. A stationary
//! side stays stationary while the applied voltage cannot overcome `k_s`.
//!
//! With `k_a = 0` a side has no inertia and moves at its steady state speed
//! `(V - k_s * sign(V)) / k_v` immediately.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::TAU;

use super::DriveHardware;
use crate::loc::Pose;
use crate::loco_ctrl::{LocoCtrlError, Params, Side, SideParams, WheelVoltages};
use util::maths::sign;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
struct SimSide {
    k_s: f64,
    k_v: f64,
    k_a: f64,

    /// Units: meters/second
    velocity_ms: f64,

    /// Total distance travelled
    ///
    /// Units: meters
    distance_m: f64,

    /// Distance at the last encoder reset
    ///
    /// Units: meters
    encoder_zero_m: f64
}

/// A simulated differential drivetrain.
#[derive(Debug, Clone, Serialize)]
pub struct SimDrivetrain {
    left: SimSide,
    right: SimSide,

    track_width_m: f64,
    wheel_circumference_m: f64,

    /// Number of integration steps per call to `step`
    substeps: usize,

    /// Voltages currently applied
    volts: WheelVoltages,

    /// True pose of the platform
    pose: Pose
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimSide {
    fn new(params: &SideParams, side: Side) -> Result<Self, LocoCtrlError> {
        if !(params.k_v > 0.0) && !(params.k_a > 0.0) {
            return Err(LocoCtrlError::DegenerateMotorModel(side))
        }

        Ok(Self {
            k_s: params.k_s,
            k_v: params.k_v,
            k_a: params.k_a,
            velocity_ms: 0.0,
            distance_m: 0.0,
            encoder_zero_m: 0.0
        })
    }

    fn step(&mut self, volts: f64, dt_s: f64) {
        if !(self.k_a > 0.0) {
            self.velocity_ms = if volts.abs() <= self.k_s {
                0.0
            }
            else {
                (volts - self.k_s * sign(volts)) / self.k_v
            };
            self.distance_m += self.velocity_ms * dt_s;
            return
        }

        let v = self.velocity_ms;

        // Friction opposes motion, or the applied voltage when stationary
        let friction_dir = if v == 0.0 { sign(volts) } else { sign(v) };

        let mut new_v = if v == 0.0 && volts.abs() <= self.k_s {
            0.0
        }
        else {
            let accel = (volts - self.k_s * friction_dir - self.k_v * v) / self.k_a;
            v + accel * dt_s
        };

        // Static friction catches a side which would reverse
        if v != 0.0 && sign(new_v) != sign(v) && volts.abs() <= self.k_s {
            new_v = 0.0;
        }

        self.velocity_ms = new_v;
        self.distance_m += new_v * dt_s;
    }
}

impl SimDrivetrain {
    /// Create a stationary drivetrain at `initial_pose`, using the drive
    /// parameters' motor model for each side.
    pub fn new(
        params: &Params, 
        initial_pose: Pose, 
        substeps: usize
    ) -> Result<Self, LocoCtrlError> {
        Ok(Self {
            left: SimSide::new(&params.left, Side::Left)?,
            right: SimSide::new(&params.right, Side::Right)?,
            track_width_m: params.track_width_m,
            wheel_circumference_m: TAU * params.wheel_radius_m,
            substeps: substeps.max(1),
            volts: WheelVoltages::zero(),
            pose: initial_pose
        })
    }

    /// Advance the simulation by `dt_s` seconds with the applied voltages.
    pub fn step(&mut self, dt_s: f64) {
        if !(dt_s > 0.0) {
            return
        }

        let h = dt_s / self.substeps as f64;

        for _ in 0..self.substeps {
            self.left.step(self.volts.left_v, h);
            self.right.step(self.volts.right_v, h);

            let v_ms = 0.5 * (self.left.velocity_ms + self.right.velocity_ms);
            let omega_rads = (self.right.velocity_ms - self.left.velocity_ms) 
                / self.track_width_m;

            let mid_heading_rad = self.pose.heading_rad + 0.5 * omega_rads * h;

            self.pose.position_m += Vector2::new(
                mid_heading_rad.cos(), 
                mid_heading_rad.sin()
            ) * (v_ms * h);
            self.pose.heading_rad += omega_rads * h;
        }
    }

    /// The true pose of the simulated platform.
    pub fn true_pose(&self) -> Pose {
        self.pose
    }

    pub fn applied_voltages(&self) -> WheelVoltages {
        self.volts
    }
}

impl DriveHardware for SimDrivetrain {
    fn heading_rad(&self) -> f64 {
        self.pose.heading_rad
    }

    fn left_rotations(&self) -> f64 {
        (self.left.distance_m - self.left.encoder_zero_m) / self.wheel_circumference_m
    }

    fn right_rotations(&self) -> f64 {
        (self.right.distance_m - self.right.encoder_zero_m) / self.wheel_circumference_m
    }

    fn left_rate_rps(&self) -> f64 {
        self.left.velocity_ms / self.wheel_circumference_m
    }

    fn right_rate_rps(&self) -> f64 {
        self.right.velocity_ms / self.wheel_circumference_m
    }

    fn reset_encoders(&mut self) {
        self.left.encoder_zero_m = self.left.distance_m;
        self.right.encoder_zero_m = self.right.distance_m;
    }

    fn set_voltages(&mut self, volts: WheelVoltages) {
        self.volts = volts;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loco_ctrl::params::test::drive_params;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_stiction() {
        let params = drive_params();
        let mut sim = SimDrivetrain::new(&params, Pose::default(), 10).unwrap();

        // Below the static friction voltage nothing moves
        sim.set_voltages(WheelVoltages::new(0.5, -0.5));
        for _ in 0..50 {
            sim.step(0.02);
        }
        assert_eq!(sim.true_pose(), Pose::default());
        assert_eq!(sim.left_rate_rps(), 0.0);
    }

    #[test]
    fn test_steady_state_speed() {
        let params = drive_params();
        let mut sim = SimDrivetrain::new(&params, Pose::default(), 10).unwrap();

        // Feedforward voltage for 1 m/s settles at 1 m/s, driving straight
        let volts = WheelVoltages::new(
            params.left.k_s + params.left.k_v,
            params.right.k_s + params.right.k_v
        );
        sim.set_voltages(volts);
        for _ in 0..200 {
            sim.step(0.02);
        }

        let circ = TAU * params.wheel_radius_m;
        assert_abs_diff_eq!(sim.left_rate_rps() * circ, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sim.right_rate_rps() * circ, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sim.true_pose().heading_rad, 0.0, epsilon = 1e-2);
        assert!(sim.true_pose().x_m() > 3.0);

        // Removing the voltage brings the drivetrain to rest
        sim.set_voltages(WheelVoltages::zero());
        for _ in 0..100 {
            sim.step(0.02);
        }
        assert_eq!(sim.left_rate_rps(), 0.0);
        assert_eq!(sim.right_rate_rps(), 0.0);
    }

    #[test]
    fn test_encoder_reset() {
        let params = drive_params();
        let mut sim = SimDrivetrain::new(&params, Pose::default(), 4).unwrap();
        sim.set_voltages(WheelVoltages::new(3.0, 3.0));
        sim.step(0.5);
        assert!(sim.left_rotations() > 0.0);

        sim.reset_encoders();
        assert_eq!(sim.left_rotations(), 0.0);
        assert_eq!(sim.right_rotations(), 0.0);
    }

    #[test]
    fn test_no_inertia() {
        let mut params = drive_params();
        params.left.k_a = 0.0;
        params.right.k_a = 0.0;
        let mut sim = SimDrivetrain::new(&params, Pose::default(), 10).unwrap();

        let volts = WheelVoltages::new(
            params.left.k_s + params.left.k_v * 1.5,
            params.right.k_s + params.right.k_v * 1.5
        );
        sim.set_voltages(volts);
        sim.step(0.02);

        let circ = TAU * params.wheel_radius_m;
        assert_abs_diff_eq!(sim.left_rate_rps() * circ, 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(sim.right_rate_rps() * circ, 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(sim.left_rotations() * circ, 0.03, epsilon = 1e-9);

        sim.set_voltages(WheelVoltages::new(0.5, -0.5));
        sim.step(0.02);
        assert_eq!(sim.left_rate_rps(), 0.0);
        assert_eq!(sim.right_rate_rps(), 0.0);
    }

    #[test]
    fn test_degenerate_motor_model() {
        let mut params = drive_params();
        params.right.k_v = 0.0;
        params.right.k_a = 0.0;

        match SimDrivetrain::new(&params, Pose::default(), 1) {
            Err(LocoCtrlError::DegenerateMotorModel(Side::Right)) => (),
            other => panic!("Expected a degenerate model error, got {:?}", other.map(|_| ()))
        }
    }
}
