//! # Demo trajectories
//!
//! Constant velocity trajectories, used by the executable's demo run and by tests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{
    pose::{Pose2D, Twist2D},
    traj_ctrl::{PoseDual, Trajectory},
};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Straight line along the start pose's heading.
#[derive(Debug, Copy, Clone)]
pub struct LineTrajectory {
    start: Pose2D,

    /// Units: inches/second
    speed: f64,

    /// Units: seconds
    duration: f64,
}

/// Turn on the spot about the start pose.
#[derive(Debug, Copy, Clone)]
pub struct TurnTrajectory {
    start: Pose2D,

    /// Units: radians/second
    rate: f64,

    /// Units: seconds
    duration: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineTrajectory {
    pub fn new(start: Pose2D, speed: f64, duration: f64) -> Self {
        Self { start, speed, duration }
    }
}

impl Trajectory for LineTrajectory {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn get(&self, t: f64) -> PoseDual {
        let t = clamp(&t, &0.0, &self.duration);

        PoseDual {
            pose: self.start.compose(&Pose2D::new(self.speed * t, 0.0, 0.0)),
            vel: Twist2D::new(self.speed, 0.0, 0.0).rotate(self.start.heading),
            accel: Twist2D::zero(),
        }
    }
}

impl TurnTrajectory {
    pub fn new(start: Pose2D, rate: f64, duration: f64) -> Self {
        Self { start, rate, duration }
    }
}

impl Trajectory for TurnTrajectory {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn get(&self, t: f64) -> PoseDual {
        let t = clamp(&t, &0.0, &self.duration);

        PoseDual {
            pose: Pose2D::new(self.start.x, self.start.y, self.start.heading + self.rate * t),
            vel: Twist2D::new(0.0, 0.0, self.rate),
            accel: Twist2D::zero(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
