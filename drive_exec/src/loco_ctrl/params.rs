//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::{LocoCtrlError, Side};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Distance between the left and right wheel contact points.
    ///
    /// Units: meters
    pub track_width_m: f64,

    /// The radius of the drive wheels.
    ///
    /// Units: meters
    pub wheel_radius_m: f64,

    // ---- CAPABILITIES ----

    /// Maximum magnitude of the voltage applied to either side.
    ///
    /// Units: volts
    pub max_voltage_v: f64,

    // ---- MOTOR MODEL AND CORRECTION ----

    pub left: SideParams,

    pub right: SideParams
}

/// Motor model and correction gains for one side of the drivetrain.
#[derive(Debug, Clone, Deserialize)]
pub struct SideParams {
    /// Static friction voltage
    ///
    /// Units: volts
    pub k_s: f64,

    /// Velocity feedforward gain
    ///
    /// Units: volts/(meters/second)
    pub k_v: f64,

    /// Acceleration feedforward gain
    ///
    /// Units: volts/(meters/second^2)
    pub k_a: f64,

    /// Proportional gain on wheel speed error
    pub k_p: f64,

    /// Integral gain on wheel speed error
    #[serde(default)]
    pub k_i: f64,

    /// Derivative gain on wheel speed error
    #[serde(default)]
    pub k_d: f64,

    /// Bound on the magnitude of the integral accumulation, unbounded if not
    /// given.
    #[serde(default)]
    pub i_max: Option<f64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters describe a physically meaningful drivetrain.
    pub fn validate(&self) -> Result<(), LocoCtrlError> {
        if !(self.track_width_m > 0.0) || !self.track_width_m.is_finite() {
            return Err(LocoCtrlError::InvalidTrackWidth(self.track_width_m))
        }
        if !(self.wheel_radius_m > 0.0) || !self.wheel_radius_m.is_finite() {
            return Err(LocoCtrlError::InvalidWheelRadius(self.wheel_radius_m))
        }
        if !(self.max_voltage_v > 0.0) || !self.max_voltage_v.is_finite() {
            return Err(LocoCtrlError::InvalidMaxVoltage(self.max_voltage_v))
        }

        self.left.validate(Side::Left)?;
        self.right.validate(Side::Right)
    }
}

impl SideParams {
    fn validate(&self, side: Side) -> Result<(), LocoCtrlError> {
        let gains = [
            ("k_s", self.k_s),
            ("k_v", self.k_v),
            ("k_a", self.k_a),
            ("k_p", self.k_p),
            ("k_i", self.k_i),
            ("k_d", self.k_d),
            ("i_max", self.i_max.unwrap_or(0.0))
        ];

        for &(name, value) in gains.iter() {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(LocoCtrlError::InvalidGain { side, name, value })
            }
        }

        Ok(())
    }
}
