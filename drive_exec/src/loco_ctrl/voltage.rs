//! Voltage synthesiser
//!
//! Each side's voltage is the motor feedforward for the desired wheel speed
//! and acceleration plus a PID correction on the wheel speed error, clamped
//! to the maximum voltage.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    LocoCtrlError, Params, PidController, SideParams, SimpleMotorFeedforward, 
    WheelSpeeds
};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Voltage demand for each side of the drivetrain.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Default)]
pub struct WheelVoltages {
    /// Units: volts
    pub left_v: f64,

    /// Units: volts
    pub right_v: f64
}

/// Status report for the voltage synthesiser, describing the last call to
/// `synthesize`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Default)]
pub struct StatusReport {
    /// True if the call was bypassed because there was no valid dt
    pub bypassed: bool,

    pub left_ff_v: f64,
    pub right_ff_v: f64,

    pub left_pid_v: f64,
    pub right_pid_v: f64,

    pub left_limited: bool,
    pub right_limited: bool
}

/// Turns desired wheel speeds into drive voltages.
#[derive(Debug, Clone)]
pub struct VoltageSynth {
    left_ff: SimpleMotorFeedforward,
    right_ff: SimpleMotorFeedforward,

    left_pid: PidController,
    right_pid: PidController,

    max_voltage_v: f64,

    report: StatusReport
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelVoltages {
    pub fn new(left_v: f64, right_v: f64) -> Self {
        Self { left_v, right_v }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Clamp both sides to `[-max_voltage_v, max_voltage_v]`.
    ///
    /// NaN demands are replaced with zero.
    pub fn clamped(&self, max_voltage_v: f64) -> Self {
        Self {
            left_v: clamp_or_zero(self.left_v, max_voltage_v),
            right_v: clamp_or_zero(self.right_v, max_voltage_v)
        }
    }
}

impl VoltageSynth {
    pub fn new(params: &Params) -> Result<Self, LocoCtrlError> {
        params.validate()?;

        Ok(Self {
            left_ff: feedforward(&params.left),
            right_ff: feedforward(&params.right),
            left_pid: pid(&params.left),
            right_pid: pid(&params.right),
            max_voltage_v: params.max_voltage_v,
            report: StatusReport::default()
        })
    }

    /// Reset the internal state of both PID controllers.
    pub fn reset(&mut self) {
        self.left_pid.reset();
        self.right_pid.reset();
        self.report = StatusReport::default();
    }

    /// Calculate the voltage for each side.
    ///
    /// `dt_s` is the time since `previous_desired` was demanded. If it is not
    /// strictly positive zero voltage is returned and the controllers are not
    /// updated.
    pub fn synthesize(
        &mut self,
        desired: WheelSpeeds,
        previous_desired: WheelSpeeds,
        measured: WheelSpeeds,
        dt_s: f64
    ) -> WheelVoltages {
        if !(dt_s > 0.0) {
            self.report = StatusReport {
                bypassed: true,
                ..Default::default()
            };
            return WheelVoltages::zero()
        }

        let left_ff_v = self.left_ff.calculate(
            desired.left_ms, 
            (desired.left_ms - previous_desired.left_ms) / dt_s
        );
        let right_ff_v = self.right_ff.calculate(
            desired.right_ms, 
            (desired.right_ms - previous_desired.right_ms) / dt_s
        );

        let left_pid_v = self.left_pid.calculate(measured.left_ms, desired.left_ms, dt_s);
        let right_pid_v = self.right_pid.calculate(measured.right_ms, desired.right_ms, dt_s);

        let raw = WheelVoltages::new(left_ff_v + left_pid_v, right_ff_v + right_pid_v);
        let out = raw.clamped(self.max_voltage_v);

        self.report = StatusReport {
            bypassed: false,
            left_ff_v,
            right_ff_v,
            left_pid_v,
            right_pid_v,
            left_limited: out.left_v != raw.left_v,
            right_limited: out.right_v != raw.right_v
        };

        trace!(
            "VoltageSynth: ff ({:.3}, {:.3}) V, pid ({:.3}, {:.3}) V, out ({:.3}, {:.3}) V",
            left_ff_v, right_ff_v, left_pid_v, right_pid_v, out.left_v, out.right_v
        );

        out
    }

    /// The status report from the last call to `synthesize`.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    pub fn max_voltage_v(&self) -> f64 {
        self.max_voltage_v
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn feedforward(side: &SideParams) -> SimpleMotorFeedforward {
    SimpleMotorFeedforward::new(side.k_s, side.k_v, side.k_a)
}

fn pid(side: &SideParams) -> PidController {
    let pid = PidController::new(side.k_p, side.k_i, side.k_d);

    match side.i_max {
        Some(i_max) => pid.with_integral_limit(i_max),
        None => pid
    }
}

fn clamp_or_zero(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    }
    else {
        clamp(value, -max, max)
    }
}
