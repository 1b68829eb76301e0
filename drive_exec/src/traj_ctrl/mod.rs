//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the robot on a trajectory produced by the
//! (external) trajectory generator. A trajectory gives the target pose, velocity and acceleration
//! of the robot at each point in time.
//!
//! Each cycle the target is sampled at the elapsed time and compared against the odometry
//! estimate. A feedback controller turns the tracking error into a corrected chassis velocity,
//! which is mapped onto wheel velocities by the chassis kinematics. A feedforward motor model then
//! gives the wheel powers, compensated for the current supply voltage.
//!
//! Following is done by [`FollowAction`]s, non-blocking state machines stepped once per cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod action;
pub mod controllers;
pub mod feedforward;
pub mod params;
pub mod state;
pub mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use action::*;
pub use controllers::*;
pub use feedforward::*;
pub use params::Params;
pub use state::*;
pub use trajectory::*;

use crate::loco_ctrl::LocoCtrlError;
use hw_if::registry::PortError;
use util::params::LoadError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur while configuring the drive controller.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Could not configure the chassis: {0}")]
    LocoCtrlError(#[from] LocoCtrlError),

    #[error("Drive port unavailable: {0}")]
    PortError(#[from] PortError),

    /// The number of wheel groups in the parameters doesn't match the chassis.
    #[error("Expected {expected} wheel groups for this chassis, found {found}")]
    WrongWheelGroups { expected: usize, found: usize },

    #[error("Invalid drive parameters: {0}")]
    InvalidParams(String),
}
