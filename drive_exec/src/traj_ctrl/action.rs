//! # Follow actions
//!
//! An action follows one trajectory. It is stepped once per control cycle and reports whether it
//! is still running, so that long motions never block the control loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;

// Internal
use super::{DriveCtrl, Trajectory};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows a trajectory with the drive controller.
///
/// Once finished an action cannot be restarted, create a new one instead.
pub struct FollowAction {
    traj: Box<dyn Trajectory>,

    kind: ActionKind,

    /// Clock time of the first step.
    ///
    /// Units: seconds
    begin_s: f64,

    state: ActionState,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What the trajectory of an action represents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    FollowPath,

    /// Turn on the spot.
    Turn,
}

/// Lifecycle of an action. Each state is handled by a `mode_xyz` function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ActionState {
    NotStarted,
    Running,
    Finished,
}

/// Result of stepping an action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    NotRunning,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FollowAction {
    pub fn new(traj: Box<dyn Trajectory>, kind: ActionKind) -> Self {
        Self {
            traj,
            kind,
            begin_s: 0.0,
            state: ActionState::NotStarted,
        }
    }

    pub fn follow_path(traj: Box<dyn Trajectory>) -> Self {
        Self::new(traj, ActionKind::FollowPath)
    }

    pub fn turn(traj: Box<dyn Trajectory>) -> Self {
        Self::new(traj, ActionKind::Turn)
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    /// Perform one cycle of the action, writing wheel powers through `drive`.
    pub fn step(&mut self, drive: &mut DriveCtrl) -> ActionStatus {
        match self.state {
            ActionState::NotStarted => self.mode_not_started(drive),
            ActionState::Running => self.mode_running(drive),
            ActionState::Finished => ActionStatus::NotRunning,
        }
    }

    fn mode_not_started(&mut self, drive: &mut DriveCtrl) -> ActionStatus {
        self.begin_s = drive.now();
        self.state = ActionState::Running;

        info!(
            "Starting {:?} action, duration {:.3} s",
            self.kind,
            self.traj.duration()
        );

        self.mode_running(drive)
    }

    fn mode_running(&mut self, drive: &mut DriveCtrl) -> ActionStatus {
        let elapsed = drive.now() - self.begin_s;

        if elapsed > self.traj.duration() {
            return self.finish(drive);
        }

        let target = self.traj.get(elapsed);
        debug!("{:?} target at {:.3} s: {:?}", self.kind, elapsed, target.pose);

        drive.track(self.kind, &target);

        ActionStatus::Running
    }

    fn finish(&mut self, drive: &mut DriveCtrl) -> ActionStatus {
        drive.stop();
        drive.save_pose();
        self.state = ActionState::Finished;

        info!("{:?} action finished", self.kind);

        ActionStatus::NotRunning
    }
}
