//! Trajectory control module state
//!
//! `RamseteCmd` is the per-tick control-loop driver. It owns a
//! `ControllerSession` for the duration of one run:
//!
//! - `Idle` until started
//! - `Initializing` from start until the first tick, which emits zero voltage
//!   and records the time as the previous timestamp
//! - `Tracking` until the elapsed time reaches the trajectory duration
//! - `Terminal` once finished or cancelled. Cancelling emits zero voltage,
//!   finishing normally leaves the last voltage in place.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;
use std::sync::Arc;

// Internal
use super::{Params, RamseteController, TrajCtrlError, Trajectory, TrajectoryState};
use crate::cmd::{Command, RunStatus};
use crate::drive::DriveIf;
use crate::loco_ctrl::{
    self, ChassisSpeeds, DiffDriveKinematics, VoltageSynth, WheelSpeeds, WheelVoltages
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Elapsed time of a run, advanced by the period handed to each tick.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct Stopwatch {
    elapsed_s: f64
}

/// Transient state kept across the ticks of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ControllerSession {
    stopwatch: Stopwatch,

    /// Desired wheel speeds from the previous tick
    prev_desired: WheelSpeeds,

    /// Elapsed time at the previous tick, `None` until the first tick
    prev_time_s: Option<f64>,

    /// The trajectory sample tracked on the last tick
    last_desired: Option<TrajectoryState>
}

/// Drives the platform along a trajectory using the RAMSETE law.
#[derive(Debug, Clone)]
pub struct RamseteCmd {
    trajectory: Arc<Trajectory>,

    controller: RamseteController,
    kinematics: DiffDriveKinematics,
    synth: VoltageSynth,

    state: DriverState,
    session: ControllerSession,

    last_output: WheelVoltages
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The states of the control-loop driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum DriverState {
    Idle,
    Initializing,
    Tracking,
    Terminal
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Stopwatch {
    pub fn reset(&mut self) {
        self.elapsed_s = 0.0;
    }

    /// Advance the stopwatch, periods which are not strictly positive are
    /// ignored.
    pub fn advance(&mut self, dt_s: f64) {
        if dt_s > 0.0 {
            self.elapsed_s += dt_s;
        }
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }
}

impl ControllerSession {
    pub fn elapsed_s(&self) -> f64 {
        self.stopwatch.elapsed_s()
    }

    pub fn prev_desired(&self) -> WheelSpeeds {
        self.prev_desired
    }

    pub fn prev_time_s(&self) -> Option<f64> {
        self.prev_time_s
    }

    pub fn last_desired(&self) -> Option<&TrajectoryState> {
        self.last_desired.as_ref()
    }
}

impl RamseteCmd {
    pub fn new(
        trajectory: Arc<Trajectory>,
        controller: RamseteController,
        kinematics: DiffDriveKinematics,
        synth: VoltageSynth
    ) -> Self {
        Self {
            trajectory,
            controller,
            kinematics,
            synth,
            state: DriverState::Idle,
            session: ControllerSession::default(),
            last_output: WheelVoltages::zero()
        }
    }

    /// Build the command from the drive and trajectory control parameters.
    pub fn from_params(
        trajectory: Arc<Trajectory>,
        loco_params: &loco_ctrl::Params,
        traj_params: &Params
    ) -> Result<Self, TrajCtrlError> {
        Ok(Self::new(
            trajectory,
            RamseteController::from_params(traj_params)?,
            DiffDriveKinematics::new(loco_params.track_width_m)?,
            VoltageSynth::new(loco_params)?
        ))
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn session(&self) -> &ControllerSession {
        &self.session
    }

    pub fn trajectory(&self) -> &Arc<Trajectory> {
        &self.trajectory
    }

    pub fn controller(&self) -> &RamseteController {
        &self.controller
    }

    pub fn synth_report(&self) -> &loco_ctrl::StatusReport {
        self.synth.report()
    }

    /// The voltage emitted on the last tick.
    pub fn last_output(&self) -> WheelVoltages {
        self.last_output
    }

    fn emit(&mut self, drive: &mut dyn DriveIf, volts: WheelVoltages) {
        drive.set_voltages(volts);
        self.last_output = volts;
    }

    /// Run one tracking step at the current elapsed time.
    fn track(&mut self, drive: &mut dyn DriveIf) {
        let now_s = self.session.elapsed_s();
        let dt_s = match self.session.prev_time_s {
            Some(t) => now_s - t,
            None => 0.0
        };

        let desired = self.trajectory.sample(now_s);
        let chassis = self.controller.calculate(&drive.pose(), &desired);
        let target = self.kinematics.to_wheel_speeds(chassis);

        let volts = self.synth.synthesize(
            target, 
            self.session.prev_desired, 
            drive.wheel_speeds(), 
            dt_s
        );
        self.emit(drive, volts);

        trace!(
            "RamseteCmd at {:.3} s: target ({:.3}, {:.3}) m/s, out ({:.3}, {:.3}) V",
            now_s, target.left_ms, target.right_ms, volts.left_v, volts.right_v
        );

        self.session.prev_desired = target;
        self.session.prev_time_s = Some(now_s);
        self.session.last_desired = Some(desired);
    }
}

impl Command for RamseteCmd {
    fn on_start(&mut self, _drive: &mut dyn DriveIf) {
        let initial = self.trajectory.sample(0.0);

        self.session = ControllerSession {
            prev_desired: self.kinematics.to_wheel_speeds(
                ChassisSpeeds::new(initial.velocity_ms, initial.omega_rads())
            ),
            ..Default::default()
        };
        self.synth.reset();
        self.last_output = WheelVoltages::zero();
        self.state = DriverState::Initializing;

        debug!(
            "RamseteCmd started, trajectory duration {:.3} s", 
            self.trajectory.total_duration_s()
        );
    }

    fn on_tick(&mut self, drive: &mut dyn DriveIf, dt_s: f64) -> RunStatus {
        match self.state {
            DriverState::Idle => {
                warn!("RamseteCmd ticked before being started");
                return RunStatus::Running
            },
            DriverState::Terminal => return RunStatus::Finished,
            DriverState::Initializing => {
                // No previous timestamp, so no acceleration can be derived
                self.emit(drive, WheelVoltages::zero());
                self.session.prev_time_s = Some(self.session.elapsed_s());
                self.state = DriverState::Tracking;

                debug!("RamseteCmd first tick, zero voltage emitted");
            },
            DriverState::Tracking => {
                self.session.stopwatch.advance(dt_s);
                self.track(drive);
            }
        }

        if self.session.elapsed_s() >= self.trajectory.total_duration_s() {
            self.state = DriverState::Terminal;
            RunStatus::Finished
        }
        else {
            RunStatus::Running
        }
    }

    fn on_end(&mut self, drive: &mut dyn DriveIf, interrupted: bool) {
        if interrupted {
            self.emit(drive, WheelVoltages::zero());
            debug!(
                "RamseteCmd cancelled at {:.3} s", 
                self.session.elapsed_s()
            );
        }
        else {
            debug!(
                "RamseteCmd finished at {:.3} s, pose error {:?}", 
                self.session.elapsed_s(), 
                self.controller.pose_error()
            );
        }

        self.state = DriverState::Terminal;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive::mock::MockDrive;
    use crate::loco_ctrl::params::test::drive_params;
    use crate::traj_ctrl::params::test::traj_ctrl_params;
    use crate::traj_ctrl::trajectory::test::constant_velocity;
    use approx::assert_abs_diff_eq;

    const DT_S: f64 = 0.02;

    fn ramsete(traj: Trajectory) -> RamseteCmd {
        RamseteCmd::from_params(
            Arc::new(traj), 
            &drive_params(), 
            &traj_ctrl_params()
        ).unwrap()
    }

    #[test]
    fn test_first_tick_zero() {
        let mut cmd = ramsete(constant_velocity(2.0, 2.0));
        let mut drive = MockDrive::default();

        // Even with a large pose error the first tick is zero
        drive.pose = crate::loc::Pose::new(-1.0, 0.5, 1.0);

        assert_eq!(cmd.state(), DriverState::Idle);
        cmd.on_start(&mut drive);
        assert_eq!(cmd.state(), DriverState::Initializing);
        assert_eq!(cmd.session().prev_time_s(), None);
        assert_eq!(cmd.session().prev_desired(), WheelSpeeds::new(2.0, 2.0));

        assert_eq!(cmd.on_tick(&mut drive, DT_S), RunStatus::Running);
        assert_eq!(drive.voltages, vec![WheelVoltages::new(0.0, 0.0)]);
        assert_eq!(cmd.state(), DriverState::Tracking);
        assert_eq!(cmd.session().prev_time_s(), Some(0.0));
    }

    #[test]
    fn test_constant_velocity_feedforward_only() {
        let params = drive_params();
        let traj = constant_velocity(2.0, 2.0);
        let mut cmd = ramsete(traj.clone());
        let mut drive = MockDrive::default();
        drive.speeds = WheelSpeeds::new(2.0, 2.0);

        cmd.on_start(&mut drive);
        cmd.on_tick(&mut drive, DT_S);

        let mut ticks = 0;
        loop {
            // Place the platform exactly on the trajectory for this tick
            let next_s = cmd.session().elapsed_s() + DT_S;
            drive.pose = traj.sample(next_s).pose;

            let status = cmd.on_tick(&mut drive, DT_S);
            ticks += 1;

            let out = cmd.last_output();
            assert_abs_diff_eq!(
                out.left_v, params.left.k_s + params.left.k_v * 2.0, epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                out.right_v, params.right.k_s + params.right.k_v * 2.0, epsilon = 1e-9
            );
            assert_abs_diff_eq!(cmd.synth_report().left_pid_v, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(cmd.synth_report().right_pid_v, 0.0, epsilon = 1e-9);

            if status == RunStatus::Finished {
                break
            }
            assert!(ticks < 200);
        }

        assert!(ticks == 100 || ticks == 101);
        assert_eq!(cmd.state(), DriverState::Terminal);

        // Normal completion leaves the last voltage in place
        cmd.on_end(&mut drive, false);
        assert!(drive.voltages.last().unwrap().left_v > 0.0);
        assert!(cmd.controller().at_reference());
    }

    #[test]
    fn test_cancel_zeroes_voltage() {
        let mut cmd = ramsete(constant_velocity(2.0, 2.0));
        let mut drive = MockDrive::default();

        cmd.on_start(&mut drive);
        for _ in 0..10 {
            assert_eq!(cmd.on_tick(&mut drive, DT_S), RunStatus::Running);
        }
        assert!(cmd.last_output().left_v > 0.0);

        cmd.on_end(&mut drive, true);
        assert_eq!(drive.voltages.last(), Some(&WheelVoltages::zero()));
        assert_eq!(cmd.state(), DriverState::Terminal);
        assert_eq!(cmd.on_tick(&mut drive, DT_S), RunStatus::Finished);
    }

    #[test]
    fn test_tick_before_start() {
        let mut cmd = ramsete(constant_velocity(2.0, 2.0));
        let mut drive = MockDrive::default();

        assert_eq!(cmd.on_tick(&mut drive, DT_S), RunStatus::Running);
        assert!(drive.voltages.is_empty());
        assert_eq!(cmd.state(), DriverState::Idle);
    }

    #[test]
    fn test_restart_resets_session() {
        let mut cmd = ramsete(constant_velocity(1.0, 0.1));
        let mut drive = MockDrive::default();

        cmd.on_start(&mut drive);
        while cmd.on_tick(&mut drive, DT_S) == RunStatus::Running {}
        assert!(cmd.session().elapsed_s() >= 0.1);

        cmd.on_start(&mut drive);
        assert_eq!(cmd.session().elapsed_s(), 0.0);
        assert_eq!(cmd.session().prev_time_s(), None);
        assert_eq!(cmd.state(), DriverState::Initializing);
    }
}
