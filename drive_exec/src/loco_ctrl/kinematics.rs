//! Differential drive kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::LocoCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Linear speed of each side's wheels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Default)]
pub struct WheelSpeeds {
    /// Units: meters/second
    pub left_ms: f64,

    /// Units: meters/second
    pub right_ms: f64
}

/// Motion of the whole chassis.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Default)]
pub struct ChassisSpeeds {
    /// Forward speed
    ///
    /// Units: meters/second
    pub v_ms: f64,

    /// Anticlockwise turn rate
    ///
    /// Units: radians/second
    pub omega_rads: f64
}

/// Converts between chassis and wheel speeds for a given track width.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct DiffDriveKinematics {
    track_width_m: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelSpeeds {
    pub fn new(left_ms: f64, right_ms: f64) -> Self {
        Self { left_ms, right_ms }
    }
}

impl ChassisSpeeds {
    pub fn new(v_ms: f64, omega_rads: f64) -> Self {
        Self { v_ms, omega_rads }
    }
}

impl DiffDriveKinematics {
    pub fn new(track_width_m: f64) -> Result<Self, LocoCtrlError> {
        if !(track_width_m > 0.0) || !track_width_m.is_finite() {
            return Err(LocoCtrlError::InvalidTrackWidth(track_width_m))
        }

        Ok(Self { track_width_m })
    }

    pub fn track_width_m(&self) -> f64 {
        self.track_width_m
    }

    pub fn to_wheel_speeds(&self, chassis: ChassisSpeeds) -> WheelSpeeds {
        let half_diff = chassis.omega_rads * self.track_width_m / 2.0;

        WheelSpeeds {
            left_ms: chassis.v_ms - half_diff,
            right_ms: chassis.v_ms + half_diff
        }
    }

    pub fn to_chassis_speeds(&self, wheels: WheelSpeeds) -> ChassisSpeeds {
        ChassisSpeeds {
            v_ms: (wheels.left_ms + wheels.right_ms) / 2.0,
            omega_rads: (wheels.right_ms - wheels.left_ms) / self.track_width_m
        }
    }
}
