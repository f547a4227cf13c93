//! Recording drive used by command tests

use super::DriveIf;
use crate::loc::Pose;
use crate::loco_ctrl::{WheelSpeeds, WheelVoltages};

/// A drive which reports the pose and speeds set by the test and records
/// everything demanded of it.
#[derive(Debug, Default)]
pub(crate) struct MockDrive {
    pub pose: Pose,
    pub speeds: WheelSpeeds,
    pub voltages: Vec<WheelVoltages>,
    pub resets: Vec<Pose>
}

impl DriveIf for MockDrive {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn reset_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.resets.push(pose);
    }

    fn wheel_speeds(&self) -> WheelSpeeds {
        self.speeds
    }

    fn set_voltages(&mut self, volts: WheelVoltages) {
        self.voltages.push(volts);
    }
}
