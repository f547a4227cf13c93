//! # Drive module
//!
//! The drivetrain subsystem. `Drive` owns the drive hardware, including the
//! heading sensor, and the odometry which uses it. Commands interact with the
//! drivetrain only through the `DriveIf` trait.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod hardware;
mod sim;

#[cfg(test)]
pub(crate) mod mock;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::f64::consts::TAU;

// Internal
pub use hardware::DriveHardware;
pub use sim::SimDrivetrain;

use crate::loc::{DiffDriveOdometry, Pose};
use crate::loco_ctrl::{LocoCtrlError, Params, WheelSpeeds, WheelVoltages};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The drivetrain interface used by commands.
pub trait DriveIf {
    /// Current pose estimate in the field frame.
    fn pose(&self) -> Pose;

    /// Re-anchor the pose estimate at `pose`, zeroing the wheel distances.
    fn reset_pose(&mut self, pose: Pose);

    /// Measured wheel speeds.
    fn wheel_speeds(&self) -> WheelSpeeds;

    /// Demand voltages on each side, clamped to the maximum voltage.
    fn set_voltages(&mut self, volts: WheelVoltages);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The drivetrain subsystem.
pub struct Drive<H: DriveHardware> {
    hardware: H,
    odometry: DiffDriveOdometry,

    /// Distance travelled by the wheel surface per rotation
    ///
    /// Units: meters
    wheel_circumference_m: f64,

    max_voltage_v: f64,

    last_voltages: WheelVoltages
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<H: DriveHardware> Drive<H> {
    /// Create the subsystem, zeroing the encoders and placing the odometry at
    /// the field origin.
    pub fn new(mut hardware: H, params: &Params) -> Result<Self, LocoCtrlError> {
        params.validate()?;

        hardware.reset_encoders();
        let odometry = DiffDriveOdometry::new(hardware.heading_rad(), Pose::default());

        Ok(Self {
            hardware,
            odometry,
            wheel_circumference_m: TAU * params.wheel_radius_m,
            max_voltage_v: params.max_voltage_v,
            last_voltages: WheelVoltages::zero()
        })
    }

    /// Update the odometry from the hardware, called once per cycle.
    ///
    /// Samples containing non-finite values are skipped.
    pub fn periodic(&mut self) {
        let heading_rad = self.hardware.heading_rad();
        let left_m = self.hardware.left_rotations() * self.wheel_circumference_m;
        let right_m = self.hardware.right_rotations() * self.wheel_circumference_m;

        if !(heading_rad.is_finite() && left_m.is_finite() && right_m.is_finite()) {
            warn!(
                "Skipping odometry update with non-finite sample (heading {} rad, \
                left {} m, right {} m)",
                heading_rad, left_m, right_m
            );
            return
        }

        self.odometry.update(heading_rad, left_m, right_m);
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// The voltages last demanded of the hardware.
    pub fn last_voltages(&self) -> WheelVoltages {
        self.last_voltages
    }
}

impl<H: DriveHardware> DriveIf for Drive<H> {
    fn pose(&self) -> Pose {
        self.odometry.pose()
    }

    fn reset_pose(&mut self, pose: Pose) {
        self.hardware.reset_encoders();
        self.odometry.reset(pose, self.hardware.heading_rad());

        debug!("Odometry reset to {:?}", pose);
    }

    fn wheel_speeds(&self) -> WheelSpeeds {
        WheelSpeeds {
            left_ms: self.hardware.left_rate_rps() * self.wheel_circumference_m,
            right_ms: self.hardware.right_rate_rps() * self.wheel_circumference_m
        }
    }

    fn set_voltages(&mut self, volts: WheelVoltages) {
        let volts = volts.clamped(self.max_voltage_v);
        self.hardware.set_voltages(volts);
        self.last_voltages = volts;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loco_ctrl::params::test::drive_params;
    use approx::assert_abs_diff_eq;

    /// Hardware reporting whatever the test sets.
    #[derive(Default)]
    struct FakeHardware {
        heading_rad: f64,
        left_rot: f64,
        right_rot: f64,
        left_rps: f64,
        right_rps: f64,
        resets: usize,
        volts: WheelVoltages
    }

    impl DriveHardware for FakeHardware {
        fn heading_rad(&self) -> f64 { self.heading_rad }
        fn left_rotations(&self) -> f64 { self.left_rot }
        fn right_rotations(&self) -> f64 { self.right_rot }
        fn left_rate_rps(&self) -> f64 { self.left_rps }
        fn right_rate_rps(&self) -> f64 { self.right_rps }

        fn reset_encoders(&mut self) {
            self.left_rot = 0.0;
            self.right_rot = 0.0;
            self.resets += 1;
        }

        fn set_voltages(&mut self, volts: WheelVoltages) {
            self.volts = volts;
        }
    }

    #[test]
    fn test_periodic_converts_rotations() {
        let params = drive_params();
        let mut drive = Drive::new(FakeHardware::default(), &params).unwrap();
        assert_eq!(drive.hardware().resets, 1);

        // One metre on both sides
        let rot = 1.0 / (TAU * params.wheel_radius_m);
        drive.hardware_mut().left_rot = rot;
        drive.hardware_mut().right_rot = rot;
        drive.periodic();

        assert_abs_diff_eq!(drive.pose().x_m(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(drive.pose().y_m(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_sample_skipped() {
        let mut drive = Drive::new(FakeHardware::default(), &drive_params()).unwrap();
        drive.hardware_mut().left_rot = 2.0;
        drive.hardware_mut().right_rot = 2.0;
        drive.hardware_mut().heading_rad = std::f64::NAN;
        drive.periodic();

        assert_eq!(drive.pose(), Pose::default());

        // Once the sensor recovers the full distance is applied
        drive.hardware_mut().heading_rad = 0.0;
        drive.periodic();
        assert!(drive.pose().x_m() > 0.0);
        assert!(drive.pose().is_finite());
    }

    #[test]
    fn test_reset_pose_and_speeds() {
        let params = drive_params();
        let mut drive = Drive::new(FakeHardware::default(), &params).unwrap();
        drive.hardware_mut().left_rot = 5.0;
        drive.hardware_mut().heading_rad = 0.3;

        drive.reset_pose(Pose::new(1.0, -1.0, 0.0));
        assert_eq!(drive.hardware().resets, 2);
        assert_eq!(drive.hardware().left_rot, 0.0);
        assert_eq!(drive.pose(), Pose::new(1.0, -1.0, 0.0));

        drive.hardware_mut().left_rps = 1.0;
        drive.hardware_mut().right_rps = -2.0;
        let speeds = drive.wheel_speeds();
        assert_abs_diff_eq!(speeds.left_ms, TAU * params.wheel_radius_m, epsilon = 1e-12);
        assert_abs_diff_eq!(speeds.right_ms, -2.0 * TAU * params.wheel_radius_m, epsilon = 1e-12);
    }

    #[test]
    fn test_set_voltages_clamped() {
        let mut drive = Drive::new(FakeHardware::default(), &drive_params()).unwrap();

        drive.set_voltages(WheelVoltages::new(20.0, -3.0));
        assert_eq!(drive.hardware().volts, WheelVoltages::new(11.0, -3.0));
        assert_eq!(drive.last_voltages(), WheelVoltages::new(11.0, -3.0));
    }
}
