//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::f64::consts::PI;
use std::sync::Arc;

use drive_lib::{
    cmd::{Cmd, Command, RunStatus},
    drive::{Drive, SimDrivetrain},
    loc::Pose,
    loco_ctrl,
    traj_ctrl::{self, RamseteCmd, Trajectory, TrajectoryState},
};

/// Control period used by the tests.
pub const DT_S: f64 = 0.02;

/// Spacing of generated trajectory states.
const STATE_SPACING_S: f64 = 0.05;

pub fn drive_params() -> loco_ctrl::Params {
    util::params::parse(include_str!("../../../params/drive.toml")).unwrap()
}

pub fn traj_ctrl_params() -> traj_ctrl::Params {
    util::params::parse(include_str!("../../../params/traj_ctrl.toml")).unwrap()
}

/// A trapezoidal velocity profile starting and ending at rest.
pub struct Trapezoid {
    pub length_m: f64,
    pub max_vel_ms: f64,
    pub accel_mss: f64,
}

impl Trapezoid {
    fn accel_time_s(&self) -> f64 {
        self.max_vel_ms / self.accel_mss
    }

    fn cruise_time_s(&self) -> f64 {
        let accel_dist_m = 0.5 * self.accel_mss * self.accel_time_s().powi(2);
        (self.length_m - 2.0 * accel_dist_m) / self.max_vel_ms
    }

    pub fn duration_s(&self) -> f64 {
        2.0 * self.accel_time_s() + self.cruise_time_s()
    }

    /// Distance, velocity and acceleration at time `t_s`.
    fn at(&self, t_s: f64) -> (f64, f64, f64) {
        let t_acc = self.accel_time_s();
        let t_cruise = self.cruise_time_s();
        let d_acc = 0.5 * self.accel_mss * t_acc.powi(2);

        if t_s < t_acc {
            (0.5 * self.accel_mss * t_s.powi(2), self.accel_mss * t_s, self.accel_mss)
        } else if t_s < t_acc + t_cruise {
            (d_acc + self.max_vel_ms * (t_s - t_acc), self.max_vel_ms, 0.0)
        } else if t_s < self.duration_s() {
            let td = t_s - t_acc - t_cruise;
            (
                d_acc + self.max_vel_ms * t_cruise + self.max_vel_ms * td
                    - 0.5 * self.accel_mss * td.powi(2),
                self.max_vel_ms - self.accel_mss * td,
                -self.accel_mss,
            )
        } else {
            (self.length_m, 0.0, 0.0)
        }
    }

    /// Build a trajectory along a path given by `pose_at(distance)`.
    fn build<F>(&self, curvature_radpm: f64, pose_at: F) -> Trajectory
    where
        F: Fn(f64) -> Pose,
    {
        let duration_s = self.duration_s();
        let n = (duration_s / STATE_SPACING_S).ceil() as usize;

        let states = (0..=n)
            .map(|i| {
                let t_s = (i as f64 * STATE_SPACING_S).min(duration_s);
                let (s_m, v_ms, a_mss) = self.at(t_s);
                TrajectoryState {
                    time_s: t_s,
                    velocity_ms: v_ms,
                    acceleration_mss: a_mss,
                    pose: pose_at(s_m),
                    curvature_radpm,
                }
            })
            .collect();

        Trajectory::new(states).unwrap()
    }

    /// A straight line from `start` along its heading.
    pub fn straight(&self, start: Pose) -> Trajectory {
        self.build(0.0, |s| {
            Pose::new(
                start.x_m() + s * start.heading_rad.cos(),
                start.y_m() + s * start.heading_rad.sin(),
                start.heading_rad,
            )
        })
    }

    /// An anticlockwise arc of radius `radius_m` from the origin along +X.
    pub fn arc(&self, radius_m: f64) -> Trajectory {
        self.build(1.0 / radius_m, |s| {
            let theta = s / radius_m;
            Pose::new(
                radius_m * theta.sin(),
                radius_m * (1.0 - theta.cos()),
                theta,
            )
        })
    }
}

/// A quarter circle of radius 2 m.
pub fn quarter_arc() -> Trajectory {
    Trapezoid {
        length_m: PI,
        max_vel_ms: 1.5,
        accel_mss: 1.0,
    }
    .arc(2.0)
}

/// Build a simulated drive positioned at the start of `traj`.
pub fn sim_drive(traj: &Trajectory) -> Drive<SimDrivetrain> {
    let params = drive_params();
    let sim = SimDrivetrain::new(&params, traj.initial_pose(), 10).unwrap();
    Drive::new(sim, &params).unwrap()
}

pub fn ramsete(traj: &Arc<Trajectory>) -> Cmd {
    Cmd::Ramsete(Box::new(
        RamseteCmd::from_params(traj.clone(), &drive_params(), &traj_ctrl_params()).unwrap(),
    ))
}

/// Run `cmd` to completion in the closed loop, returning the number of ticks.
pub fn run_to_completion(cmd: &mut Cmd, drive: &mut Drive<SimDrivetrain>, max_ticks: usize) -> usize {
    cmd.on_start(drive);

    for tick in 1..=max_ticks {
        drive.periodic();
        let status = cmd.on_tick(drive, DT_S);
        drive.hardware_mut().step(DT_S);

        if status == RunStatus::Finished {
            cmd.on_end(drive, false);
            return tick;
        }
    }

    panic!("Command did not finish within {} ticks", max_ticks);
}
