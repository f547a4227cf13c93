//! # Localisation module
//!
//! Provides the 2D pose of the platform in the field frame, along with the
//! rigid body operations used to compare and interpolate poses, and the
//! differential drive odometry which keeps the pose up to date.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod odometry;
pub use odometry::DiffDriveOdometry;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Angle below which the twist exponential and logarithm use their series
/// expansions.
const SMALL_ANGLE_RAD: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading) of the platform in the field frame.
///
/// Heading is continuous, it is not wrapped into any particular range.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose {
    /// The position in the field frame
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// The heading, anticlockwise from the field X axis
    ///
    /// Units: radians
    pub heading_rad: f64
}

/// A displacement along a constant curvature arc, expressed in the frame of
/// the pose it is applied to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Default)]
pub struct Twist {
    /// Forward displacement
    ///
    /// Units: meters
    pub dx_m: f64,

    /// Leftward displacement
    ///
    /// Units: meters
    pub dy_m: f64,

    /// Change in heading
    ///
    /// Units: radians
    pub dtheta_rad: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad
        }
    }

    pub fn x_m(&self) -> f64 {
        self.position_m.x
    }

    pub fn y_m(&self) -> f64 {
        self.position_m.y
    }

    /// Distance between the positions of two poses.
    pub fn distance_m(&self, other: &Pose) -> f64 {
        (self.position_m - other.position_m).norm()
    }

    /// Return true if all components of the pose are finite.
    pub fn is_finite(&self) -> bool {
        self.position_m.x.is_finite() 
            && self.position_m.y.is_finite() 
            && self.heading_rad.is_finite()
    }

    /// Express this pose in the frame of `other`.
    ///
    /// The heading component is wrapped into [-pi, pi].
    pub fn relative_to(&self, other: &Pose) -> Pose {
        let rot = Rotation2::new(-other.heading_rad);

        Pose {
            position_m: rot * (self.position_m - other.position_m),
            heading_rad: wrap_pi(self.heading_rad - other.heading_rad)
        }
    }

    /// Apply a twist to this pose, moving along the arc it describes.
    pub fn exp(&self, twist: &Twist) -> Pose {
        let dtheta = twist.dtheta_rad;

        let (s, c) = if dtheta.abs() < SMALL_ANGLE_RAD {
            (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
        }
        else {
            (dtheta.sin() / dtheta, (1.0 - dtheta.cos()) / dtheta)
        };

        // Displacement in the local frame, rotated into the field frame
        let local = Vector2::new(
            twist.dx_m * s - twist.dy_m * c,
            twist.dx_m * c + twist.dy_m * s
        );

        Pose {
            position_m: self.position_m + Rotation2::new(self.heading_rad) * local,
            heading_rad: self.heading_rad + dtheta
        }
    }

    /// Find the twist which takes this pose to `end`.
    ///
    /// Inverse of `exp`, so `self.exp(&self.log(end))` recovers `end` (with
    /// heading wrapped to within pi of `self`).
    pub fn log(&self, end: &Pose) -> Twist {
        let transform = end.relative_to(self);
        let dtheta = transform.heading_rad;
        let half_dtheta = 0.5 * dtheta;

        let cos_minus_one = dtheta.cos() - 1.0;

        let half_theta_by_tan = if cos_minus_one.abs() < SMALL_ANGLE_RAD {
            1.0 - dtheta * dtheta / 12.0
        }
        else {
            -(half_dtheta * dtheta.sin()) / cos_minus_one
        };

        // Multiply the translation by the complex number
        // (half_theta_by_tan - i * half_dtheta)
        let t = transform.position_m;

        Twist {
            dx_m: t.x * half_theta_by_tan + t.y * half_dtheta,
            dy_m: t.y * half_theta_by_tan - t.x * half_dtheta,
            dtheta_rad: dtheta
        }
    }

    /// Interpolate along the arc between this pose and `end`.
    ///
    /// `frac` is clamped to [0, 1].
    pub fn interpolate(&self, end: &Pose, frac: f64) -> Pose {
        if frac <= 0.0 {
            *self
        }
        else if frac >= 1.0 {
            *end
        }
        else {
            self.exp(&self.log(end).scaled(frac))
        }
    }
}

impl Twist {
    pub fn new(dx_m: f64, dy_m: f64, dtheta_rad: f64) -> Self {
        Self { dx_m, dy_m, dtheta_rad }
    }

    /// Scale all components of the twist.
    pub fn scaled(&self, factor: f64) -> Twist {
        Twist {
            dx_m: self.dx_m * factor,
            dy_m: self.dy_m * factor,
            dtheta_rad: self.dtheta_rad * factor
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn assert_pose_eq(a: &Pose, b: &Pose) {
        assert_abs_diff_eq!(a.x_m(), b.x_m(), epsilon = 1e-9);
        assert_abs_diff_eq!(a.y_m(), b.y_m(), epsilon = 1e-9);
        assert_abs_diff_eq!(a.heading_rad, b.heading_rad, epsilon = 1e-9);
    }

    #[test]
    fn test_relative_to() {
        let robot = Pose::new(1.0, 1.0, PI / 2.0);
        let target = Pose::new(1.0, 3.0, PI);

        // Target is 2 m ahead of the robot and rotated a further quarter turn
        assert_pose_eq(&target.relative_to(&robot), &Pose::new(2.0, 0.0, PI / 2.0));

        // Heading difference is wrapped
        let a = Pose::new(0.0, 0.0, 3.0);
        let b = Pose::new(0.0, 0.0, -3.0);
        assert_abs_diff_eq!(
            a.relative_to(&b).heading_rad, 6.0 - 2.0 * PI, epsilon = 1e-12
        );
    }

    #[test]
    fn test_exp_arc() {
        // A quarter circle of radius 2 anticlockwise from the origin
        let start = Pose::default();
        let end = start.exp(&Twist::new(PI, 0.0, PI / 2.0));
        assert_pose_eq(&end, &Pose::new(2.0, 2.0, PI / 2.0));

        // Straight line, rotated start
        let start = Pose::new(1.0, 0.0, PI / 2.0);
        let end = start.exp(&Twist::new(1.5, 0.0, 0.0));
        assert_pose_eq(&end, &Pose::new(1.0, 1.5, PI / 2.0));
    }

    #[test]
    fn test_log_inverts_exp() {
        let start = Pose::new(0.5, -1.0, 0.3);
        let twist = Twist::new(1.2, 0.1, -0.8);
        let end = start.exp(&twist);
        let back = start.log(&end);

        assert_abs_diff_eq!(back.dx_m, twist.dx_m, epsilon = 1e-9);
        assert_abs_diff_eq!(back.dy_m, twist.dy_m, epsilon = 1e-9);
        assert_abs_diff_eq!(back.dtheta_rad, twist.dtheta_rad, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolate() {
        let start = Pose::default();
        let end = Pose::new(2.0, 2.0, PI / 2.0);

        // Halfway along the quarter arc of radius 2
        let mid = start.interpolate(&end, 0.5);
        let r = 2.0;
        assert_pose_eq(
            &mid, 
            &Pose::new(r * (PI / 4.0).sin(), r * (1.0 - (PI / 4.0).cos()), PI / 4.0)
        );

        assert_eq!(start.interpolate(&end, -1.0), start);
        assert_eq!(start.interpolate(&end, 2.0), end);
    }
}
