//! Main drive executable entry point.
//!
//! # Architecture
//!
//! Follows a trajectory with a simulated drivetrain. The executable:
//!
//!     - Initialises the session, logging and parameters
//!     - Loads the trajectory to follow
//!     - Builds the autonomous command: reset odometry to the start of the
//!       trajectory, follow it, then stop the drive
//!     - Main loop:
//!         - Odometry update
//!         - Command processing
//!         - Drivetrain simulation
//!         - Archiving
//!     - Writes a summary of the run

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::{info, warn};
use serde::Serialize;
use std::fs::File;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use drive_lib::{
    cmd::{Cmd, Command, RunStatus, Sequence},
    drive::{Drive, DriveIf, SimDrivetrain},
    loc::Pose,
    loco_ctrl,
    params::DriveExecParams,
    traj_ctrl::{self, RamseteCmd, Trajectory},
};
use util::{
    archive::Archiver,
    logger::logger_init,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One row of the per-cycle archive.
#[derive(Serialize)]
struct CycleRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
    true_x_m: f64,
    true_y_m: f64,
    true_heading_rad: f64,
    des_x_m: f64,
    des_y_m: f64,
    des_heading_rad: f64,
    left_v: f64,
    right_v: f64,
}

/// Summary of the run, written at exit.
#[derive(Serialize)]
struct RunSummary {
    num_cycles: u64,
    finished: bool,
    final_pose: Pose,
    final_true_pose: Pose,
    final_desired_pose: Pose,
    final_error_m: f64,
    max_error_m: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("drive_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Exec params first, they hold the log configuration
    let exec_params: DriveExecParams = util::params::load("drive_exec.toml")
        .wrap_err("Could not load exec params")?;

    // Initialise logger
    logger_init(&exec_params.log, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let loco_params: loco_ctrl::Params = util::params::load("drive.toml")
        .wrap_err("Could not load drive params")?;
    let traj_params: traj_ctrl::Params = util::params::load("traj_ctrl.toml")
        .wrap_err("Could not load trajectory control params")?;

    info!("Exec parameters loaded");

    // ---- LOAD TRAJECTORY ----

    let traj_path = util::params::params_dir()
        .wrap_err("Could not find the params directory")?
        .join(&exec_params.trajectory_path);

    let trajectory = Arc::new(
        Trajectory::load(&traj_path)
            .wrap_err_with(|| format!("Could not load trajectory {:?}", traj_path))?,
    );

    info!(
        "Loaded trajectory {:?}: {} states over {:.3} s",
        traj_path,
        trajectory.states().len(),
        trajectory.total_duration_s()
    );

    // ---- INITIALISE DRIVE AND COMMANDS ----

    let sim = SimDrivetrain::new(&loco_params, trajectory.initial_pose(), exec_params.sim_substeps)
        .wrap_err("Failed to initialise the simulated drivetrain")?;
    let mut drive = Drive::new(sim, &loco_params).wrap_err("Failed to initialise the drive")?;

    let ramsete = RamseteCmd::from_params(trajectory.clone(), &loco_params, &traj_params)
        .wrap_err("Failed to initialise trajectory control")?;

    let mut auto_cmd = Cmd::Sequence(Sequence::new(vec![
        Cmd::ResetOdometry(trajectory.initial_pose()),
        Cmd::Ramsete(Box::new(ramsete)),
        Cmd::StopDrive,
    ]));

    let mut archiver = Archiver::from_path(&session, "drive.csv")
        .wrap_err("Failed to create the drive archive")?;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period_s = exec_params.cycle_period_s;
    let mut num_cycles: u64 = 0;
    let mut max_error_m = 0f64;
    let mut finished = false;

    auto_cmd.on_start(&mut drive);

    loop {
        let cycle_start_instant = Instant::now();
        let time_s = num_cycles as f64 * cycle_period_s;

        // ---- COMMAND PROCESSING ----

        drive.periodic();

        let status = auto_cmd.on_tick(&mut drive, cycle_period_s);

        drive.hardware_mut().step(cycle_period_s);

        // ---- WRITE ARCHIVES ----

        let pose = drive.pose();
        let true_pose = drive.hardware().true_pose();
        let desired = desired_pose(&auto_cmd).unwrap_or(pose);
        max_error_m = max_error_m.max(pose.distance_m(&desired));

        let volts = drive.last_voltages();
        if let Err(e) = archiver.serialise(CycleRecord {
            time_s,
            x_m: pose.x_m(),
            y_m: pose.y_m(),
            heading_rad: pose.heading_rad,
            true_x_m: true_pose.x_m(),
            true_y_m: true_pose.y_m(),
            true_heading_rad: true_pose.heading_rad,
            des_x_m: desired.x_m(),
            des_y_m: desired.y_m(),
            des_heading_rad: desired.heading_rad,
            left_v: volts.left_v,
            right_v: volts.right_v,
        }) {
            warn!("Could not archive cycle {}: {}", num_cycles, e);
        }

        num_cycles += 1;

        // ---- COMPLETION ----

        if status == RunStatus::Finished {
            auto_cmd.on_end(&mut drive, false);
            finished = true;
            info!("Autonomous command finished after {} cycles", num_cycles);
            break;
        }

        if time_s >= exec_params.max_run_time_s {
            warn!("Run exceeded {:.1} s, cancelling", exec_params.max_run_time_s);
            auto_cmd.on_end(&mut drive, true);
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        if exec_params.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match Duration::from_secs_f64(cycle_period_s).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                ),
            }
        }
    }

    // ---- SHUTDOWN ----

    if let Err(e) = archiver.flush() {
        warn!("Could not flush the drive archive: {}", e);
    }

    let final_pose = drive.pose();
    let final_desired_pose = trajectory.sample(trajectory.total_duration_s()).pose;
    let summary = RunSummary {
        num_cycles,
        finished,
        final_pose,
        final_true_pose: drive.hardware().true_pose(),
        final_desired_pose,
        final_error_m: final_pose.distance_m(&final_desired_pose),
        max_error_m,
    };

    info!(
        "Final pose ({:.3}, {:.3}, {:.3}), error to final state {:.3} m, max error {:.3} m",
        final_pose.x_m(),
        final_pose.y_m(),
        final_pose.heading_rad,
        summary.final_error_m,
        summary.max_error_m
    );

    let summary_path = session.session_root.join("summary.json");
    let summary_file = File::create(&summary_path)
        .wrap_err_with(|| format!("Could not create {:?}", summary_path))?;
    serde_json::to_writer_pretty(summary_file, &summary)
        .wrap_err("Could not write the run summary")?;

    info!("End of execution");

    Ok(())
}

/// The trajectory sample tracked on the last tick, if trajectory following
/// has begun.
fn desired_pose(cmd: &Cmd) -> Option<Pose> {
    cmd.find_ramsete()
        .and_then(|r| r.session().last_desired())
        .map(|s| s.pose)
}
