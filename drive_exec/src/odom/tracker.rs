//! Pose integration shared by the encoder based odometry sources

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use hw_if::eqpt::Clock;

use crate::pose::{Pose2D, Twist2D};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Measures the time between successive updates of a source.
pub(crate) struct CycleTimer {
    clock: Rc<dyn Clock>,
    last_s: Option<f64>,
}

/// Integrates robot-frame increments into a pose.
#[derive(Debug, Default, Clone)]
pub(crate) struct PoseTracker {
    pose: Pose2D,

    /// Frame: robot
    vel_robot: Twist2D,

    total_heading: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CycleTimer {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            last_s: None,
        }
    }

    /// Seconds since the previous call, zero on the first call.
    pub fn dt(&mut self) -> f64 {
        let now = self.clock.now();

        let dt = match self.last_s {
            Some(last) => now - last,
            None => 0.0,
        };
        self.last_s = Some(now);

        dt
    }
}

impl PoseTracker {
    /// Apply one cycle's robot-frame increment and the robot-frame velocity measured this cycle.
    pub fn apply(&mut self, incr: &Twist2D, vel_robot: &Twist2D) {
        self.pose = self.pose.integrate(incr);
        self.total_heading += incr.omega;
        self.vel_robot = *vel_robot;
    }

    pub fn set_pose(&mut self, pose: Pose2D) {
        self.pose = pose;
    }

    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Frame: field
    pub fn velocity(&self) -> Twist2D {
        self.vel_robot.rotate(self.pose.heading)
    }

    pub fn velocity_robot(&self) -> Twist2D {
        self.vel_robot
    }

    pub fn total_heading(&self) -> f64 {
        self.total_heading
    }
}

/// Implements `OdomSource` for a struct with a `tracker: PoseTracker` field and an `update_impl`
/// method.
macro_rules! tracked_source {
    ($ty:ty) => {
        impl crate::odom::OdomSource for $ty {
            fn set_pose(&mut self, pose: crate::pose::Pose2D) {
                self.tracker.set_pose(pose)
            }

            fn pose(&self) -> crate::pose::Pose2D {
                self.tracker.pose()
            }

            fn velocity(&self) -> crate::pose::Twist2D {
                self.tracker.velocity()
            }

            fn velocity_robot(&self) -> crate::pose::Twist2D {
                self.tracker.velocity_robot()
            }

            fn total_heading(&self) -> f64 {
                self.tracker.total_heading()
            }

            fn update(&mut self) {
                self.update_impl()
            }
        }
    };
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
