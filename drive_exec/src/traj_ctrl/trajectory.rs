//! Trajectory interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::pose::{Pose2D, Twist2D};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A time parameterised trajectory.
///
/// Trajectories are generated elsewhere and are assumed to already respect the robot's velocity
/// and acceleration limits.
pub trait Trajectory {
    /// Units: seconds
    fn duration(&self) -> f64;

    /// Sample the trajectory `t` seconds after its start.
    fn get(&self, t: f64) -> PoseDual;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A target pose along with its first and second time derivatives.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct PoseDual {
    pub pose: Pose2D,

    /// Frame: field
    pub vel: Twist2D,

    /// Frame: field
    pub accel: Twist2D,
}
