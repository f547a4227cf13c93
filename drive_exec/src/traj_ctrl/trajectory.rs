//! Time-indexed trajectories and their sampling

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::path::Path;

// Internal
use super::TrajectoryError;
use crate::loc::Pose;
use util::maths::lerp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Times and distances closer than this are considered equal when sampling.
const SAMPLE_EPS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single time-stamped sample of a trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TrajectoryState {
    /// Time since the start of the trajectory
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Units: meters/second
    pub velocity_ms: f64,

    /// Units: meters/second^2
    pub acceleration_mss: f64,

    /// Desired pose in the field frame
    pub pose: Pose,

    /// Units: radians/meter
    pub curvature_radpm: f64
}

/// An ordered, immutable sequence of trajectory states.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    states: Vec<TrajectoryState>
}

/// A state as exported by common path generation tools.
#[derive(Deserialize)]
struct JsonState {
    time: f64,
    velocity: f64,
    acceleration: f64,
    pose: JsonPose,
    curvature: f64
}

#[derive(Deserialize)]
struct JsonPose {
    translation: JsonTranslation,
    rotation: JsonRotation
}

#[derive(Deserialize)]
struct JsonTranslation {
    x: f64,
    y: f64
}

#[derive(Deserialize)]
struct JsonRotation {
    radians: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryState {
    /// Angular velocity implied by the velocity and curvature.
    pub fn omega_rads(&self) -> f64 {
        self.velocity_ms * self.curvature_radpm
    }

    fn is_finite(&self) -> bool {
        self.time_s.is_finite()
            && self.velocity_ms.is_finite()
            && self.acceleration_mss.is_finite()
            && self.pose.is_finite()
            && self.curvature_radpm.is_finite()
    }

    /// Interpolate between this state and `end`.
    ///
    /// The position advances along the pose arc by the distance the motion
    /// profile covers in the elapsed time, rather than linearly in time.
    pub fn interpolate(&self, end: &TrajectoryState, frac: f64) -> TrajectoryState {
        let new_time_s = lerp(self.time_s, end.time_s, frac);
        let delta_t_s = new_time_s - self.time_s;

        if delta_t_s < 0.0 {
            return end.interpolate(self, 1.0 - frac)
        }

        let reversing = self.velocity_ms < 0.0
            || (self.velocity_ms.abs() < SAMPLE_EPS && self.acceleration_mss < 0.0);

        let new_velocity_ms = self.velocity_ms + self.acceleration_mss * delta_t_s;

        let new_s_m = (self.velocity_ms * delta_t_s 
            + 0.5 * self.acceleration_mss * delta_t_s.powi(2))
            * if reversing { -1.0 } else { 1.0 };

        let distance_m = end.pose.distance_m(&self.pose);
        let pose_frac = if distance_m < SAMPLE_EPS {
            frac
        }
        else {
            new_s_m / distance_m
        };

        TrajectoryState {
            time_s: new_time_s,
            velocity_ms: new_velocity_ms,
            acceleration_mss: self.acceleration_mss,
            pose: self.pose.interpolate(&end.pose, pose_frac),
            curvature_radpm: lerp(self.curvature_radpm, end.curvature_radpm, frac)
        }
    }
}

impl Trajectory {
    /// Create a new trajectory from the given states.
    ///
    /// States must be finite and ordered by non-decreasing time.
    pub fn new(states: Vec<TrajectoryState>) -> Result<Self, TrajectoryError> {
        if states.is_empty() {
            return Err(TrajectoryError::Empty)
        }

        for (i, state) in states.iter().enumerate() {
            if !state.is_finite() {
                return Err(TrajectoryError::NonFiniteState(i))
            }

            if i > 0 && state.time_s < states[i - 1].time_s {
                return Err(TrajectoryError::NonMonotonicTime {
                    index: i,
                    time_s: state.time_s
                })
            }
        }

        Ok(Self { states })
    }

    /// Decode a trajectory from the JSON array format exported by path 
    /// generation tools.
    pub fn from_pathweaver_json(json: &str) -> Result<Self, TrajectoryError> {
        let raw: Vec<JsonState> = serde_json::from_str(json)
            .map_err(TrajectoryError::DeserialiseError)?;

        Self::new(raw.into_iter().map(|s| TrajectoryState {
            time_s: s.time,
            velocity_ms: s.velocity,
            acceleration_mss: s.acceleration,
            pose: Pose::new(
                s.pose.translation.x, 
                s.pose.translation.y, 
                s.pose.rotation.radians
            ),
            curvature_radpm: s.curvature
        }).collect())
    }

    /// Load a trajectory JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let json = std::fs::read_to_string(path)
            .map_err(TrajectoryError::FileLoadError)?;

        Self::from_pathweaver_json(&json)
    }

    /// Sample the trajectory at `t_s` seconds.
    ///
    /// Times outside the trajectory are clamped to the first or last state.
    pub fn sample(&self, t_s: f64) -> TrajectoryState {
        let first = &self.states[0];
        let last = &self.states[self.states.len() - 1];

        if t_s <= first.time_s {
            return *first
        }
        if t_s >= last.time_s {
            return *last
        }

        // Find the first state at or after t_s
        let mut low = 1;
        let mut high = self.states.len() - 1;

        while low != high {
            let mid = (low + high) / 2;
            if self.states[mid].time_s < t_s {
                low = mid + 1;
            }
            else {
                high = mid;
            }
        }

        let sample = &self.states[low];
        let prev = &self.states[low - 1];

        if (sample.time_s - prev.time_s).abs() < SAMPLE_EPS {
            return *sample
        }

        prev.interpolate(
            sample, 
            (t_s - prev.time_s) / (sample.time_s - prev.time_s)
        )
    }

    /// Time of the final state.
    pub fn total_duration_s(&self) -> f64 {
        self.states[self.states.len() - 1].time_s
    }

    pub fn initial_pose(&self) -> Pose {
        self.states[0].pose
    }

    pub fn states(&self) -> &[TrajectoryState] {
        &self.states
    }
}
