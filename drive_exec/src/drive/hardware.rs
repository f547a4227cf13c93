//! Drive hardware seam

use crate::loco_ctrl::WheelVoltages;

/// Sensor and actuator primitives of a differential drivetrain.
pub trait DriveHardware {
    /// Absolute heading from the heading sensor, anticlockwise positive.
    ///
    /// Must be continuous (unwrapped). Odometry integrates the difference
    /// between consecutive headings, so a reading that jumps by 2π at ±π
    /// loses most of that tick's travel.
    ///
    /// Units: radians
    fn heading_rad(&self) -> f64;

    /// Cumulative left wheel rotations since the encoders were last reset.
    fn left_rotations(&self) -> f64;

    /// Cumulative right wheel rotations since the encoders were last reset.
    fn right_rotations(&self) -> f64;

    /// Units: rotations/second
    fn left_rate_rps(&self) -> f64;

    /// Units: rotations/second
    fn right_rate_rps(&self) -> f64;

    /// Zero the cumulative wheel rotations.
    fn reset_encoders(&mut self);

    /// Apply the given voltages to the motors.
    fn set_voltages(&mut self, volts: WheelVoltages);
}
