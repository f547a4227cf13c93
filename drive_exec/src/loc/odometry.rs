//! Differential drive odometry
//!
//! The measured heading is authoritative: wheel travel only provides the
//! distance moved, while the change in heading comes from the heading sensor.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{Pose, Twist};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tracks the pose of a differential drive from cumulative wheel distances and
/// an absolute heading measurement.
#[derive(Debug, Clone, Serialize)]
pub struct DiffDriveOdometry {
    pose: Pose,

    /// Offset mapping the measured heading into the field frame.
    gyro_offset_rad: f64,

    /// Field frame heading at the previous update.
    prev_heading_rad: f64,

    prev_left_m: f64,
    prev_right_m: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DiffDriveOdometry {
    /// Create a new odometry starting at `initial_pose`, with the heading 
    /// sensor currently reading `heading_rad`.
    ///
    /// Wheel distances are taken to be zero at this point.
    pub fn new(heading_rad: f64, initial_pose: Pose) -> Self {
        Self {
            pose: initial_pose,
            gyro_offset_rad: initial_pose.heading_rad - heading_rad,
            prev_heading_rad: initial_pose.heading_rad,
            prev_left_m: 0.0,
            prev_right_m: 0.0
        }
    }

    /// Re-anchor the odometry at `pose`.
    ///
    /// The wheel distance baselines go back to zero, so the caller must zero
    /// the encoders at the same time.
    pub fn reset(&mut self, pose: Pose, heading_rad: f64) {
        *self = Self::new(heading_rad, pose);
    }

    /// Update the pose from the current heading measurement and the
    /// cumulative distance travelled by each wheel since the last reset.
    ///
    /// Non-finite inputs are not checked and will propagate into the pose.
    pub fn update(&mut self, heading_rad: f64, left_m: f64, right_m: f64) -> Pose {
        let delta_left_m = left_m - self.prev_left_m;
        let delta_right_m = right_m - self.prev_right_m;

        self.prev_left_m = left_m;
        self.prev_right_m = right_m;

        let avg_delta_m = 0.5 * (delta_left_m + delta_right_m);
        let angle_rad = heading_rad + self.gyro_offset_rad;

        let new_pose = self.pose.exp(&Twist::new(
            avg_delta_m, 
            0.0, 
            angle_rad - self.prev_heading_rad
        ));

        self.prev_heading_rad = angle_rad;
        self.pose = Pose {
            position_m: new_pose.position_m,
            heading_rad: angle_rad
        };

        self.pose
    }

    /// The current pose estimate.
    pub fn pose(&self) -> Pose {
        self.pose
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_straight_line() {
        let mut odom = DiffDriveOdometry::new(0.0, Pose::default());

        // Distance increases in steps up to 1 m on both sides
        let mut pose = Pose::default();
        for i in 1..=10 {
            let d = 0.1 * i as f64;
            pose = odom.update(0.0, d, d);
        }

        assert_abs_diff_eq!(pose.x_m(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pose.y_m(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pose.heading_rad, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_continuous_heading_through_pi() {
        let r = 1.5;
        let track = 0.762;
        let start = Pose::new(0.0, 0.0, 0.75 * PI);
        let mut odom = DiffDriveOdometry::new(0.75 * PI, start);

        // Two eighth turns anticlockwise, crossing pi without wrapping
        for i in 1..=2 {
            let turned = PI / 4.0 * i as f64;
            odom.update(
                0.75 * PI + turned,
                turned * (r - track / 2.0),
                turned * (r + track / 2.0)
            );
        }

        let pose = odom.pose();
        assert_abs_diff_eq!(pose.x_m(), -r * 2f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(pose.y_m(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.heading_rad, 1.25 * PI, epsilon = 1e-9);
    }

    #[test]
    fn test_arc() {
        let r = 1.5;
        let mut odom = DiffDriveOdometry::new(0.0, Pose::default());

        // Quarter turn with both wheels averaging pi * r / 2 of travel
        let track = 0.762;
        let left = PI / 2.0 * (r - track / 2.0);
        let right = PI / 2.0 * (r + track / 2.0);
        let pose = odom.update(PI / 2.0, left, right);

        assert_abs_diff_eq!(pose.x_m(), r, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.y_m(), r, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.heading_rad, PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reset_applies_heading_offset() {
        let mut odom = DiffDriveOdometry::new(0.0, Pose::default());
        odom.update(0.0, 3.0, 3.0);

        // Sensor reads 1 rad while the field heading should be pi/2
        odom.reset(Pose::new(2.0, 1.0, PI / 2.0), 1.0);
        assert_eq!(odom.pose(), Pose::new(2.0, 1.0, PI / 2.0));

        // Driving 1 m forward without turning moves along field +Y
        let pose = odom.update(1.0, 1.0, 1.0);
        assert_abs_diff_eq!(pose.x_m(), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.y_m(), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.heading_rad, PI / 2.0, epsilon = 1e-12);
    }
}
