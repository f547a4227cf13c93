//! RAMSETE nonlinear tracking law
//!
//! Given the current pose and a desired trajectory state the controller
//! returns a chassis speed which tracks the desired state's feedforward speed
//! while driving the pose error to zero.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Params, TrajCtrlError, TrajectoryState};
use crate::loc::Pose;
use crate::loco_ctrl::ChassisSpeeds;
use util::maths::sinc;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The RAMSETE controller
#[derive(Debug, Clone, Serialize)]
pub struct RamseteController {
    b: f64,
    zeta: f64,

    tolerance_m: f64,
    tolerance_rad: f64,

    /// Pose error in the frame of the current pose, from the last calculation
    pose_error: Pose,

    enabled: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RamseteController {
    /// Create a new controller.
    ///
    /// `b` must be positive and `zeta` must be in (0, 1).
    pub fn new(b: f64, zeta: f64) -> Result<Self, TrajCtrlError> {
        if !(b > 0.0) || !b.is_finite() {
            return Err(TrajCtrlError::InvalidB(b))
        }
        if !(zeta > 0.0 && zeta < 1.0) {
            return Err(TrajCtrlError::InvalidZeta(zeta))
        }

        Ok(Self {
            b,
            zeta,
            tolerance_m: 0.0,
            tolerance_rad: 0.0,
            pose_error: Pose::default(),
            enabled: true
        })
    }

    pub fn from_params(params: &Params) -> Result<Self, TrajCtrlError> {
        let mut ctrl = Self::new(params.b, params.zeta)?;
        ctrl.set_tolerance(params.tolerance_m, params.tolerance_rad);
        Ok(ctrl)
    }

    /// Set the pose error within which `at_reference` returns true.
    pub fn set_tolerance(&mut self, tolerance_m: f64, tolerance_rad: f64) {
        self.tolerance_m = tolerance_m;
        self.tolerance_rad = tolerance_rad;
    }

    /// True if the last calculated pose error was within tolerance.
    pub fn at_reference(&self) -> bool {
        self.pose_error.x_m().abs() < self.tolerance_m
            && self.pose_error.y_m().abs() < self.tolerance_m
            && self.pose_error.heading_rad.abs() < self.tolerance_rad
    }

    /// Enable or disable the controller. A disabled controller returns the
    /// feedforward speeds unchanged.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Pose error from the last calculation.
    pub fn pose_error(&self) -> &Pose {
        &self.pose_error
    }

    /// Calculate the chassis speed to track `desired` from `current`.
    pub fn calculate(&mut self, current: &Pose, desired: &TrajectoryState) -> ChassisSpeeds {
        self.calculate_raw(
            current, 
            &desired.pose, 
            desired.velocity_ms, 
            desired.omega_rads()
        )
    }

    /// Calculate the chassis speed to track `pose_ref` moving at `v_ref_ms`
    /// and `omega_ref_rads`.
    pub fn calculate_raw(
        &mut self, 
        current: &Pose, 
        pose_ref: &Pose, 
        v_ref_ms: f64, 
        omega_ref_rads: f64
    ) -> ChassisSpeeds {
        self.pose_error = pose_ref.relative_to(current);

        if !self.enabled {
            return ChassisSpeeds::new(v_ref_ms, omega_ref_rads)
        }

        let e_x = self.pose_error.x_m();
        let e_y = self.pose_error.y_m();
        let e_theta = self.pose_error.heading_rad;

        let k = 2.0 * self.zeta 
            * (omega_ref_rads.powi(2) + self.b * v_ref_ms.powi(2)).sqrt();

        ChassisSpeeds {
            v_ms: v_ref_ms * e_theta.cos() + k * e_x,
            omega_rads: omega_ref_rads 
                + k * e_theta 
                + self.b * v_ref_ms * sinc(e_theta) * e_y
        }
    }
}
