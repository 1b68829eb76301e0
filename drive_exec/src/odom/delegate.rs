//! Pose tracking for sources which delegate the estimate to an external module

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use log::{trace, warn};

use hw_if::eqpt::{Clock, ModuleReading};
use util::maths::ang_diff;

use super::tracker::CycleTimer;
use crate::pose::{Pose2D, Twist2D};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows the pose reported by an external module.
///
/// The module's own frame is mapped into ours through `origin`, which is what `set_pose` moves.
/// When the module reports NaN the last estimate is extrapolated with the last velocity.
pub(crate) struct ModuleTracker {
    timer: CycleTimer,

    /// Transform from the module's frame to the field frame.
    origin: Pose2D,

    /// Last valid pose reported by the module, in the module's frame.
    last_module_pose: Option<Pose2D>,

    /// Module frame heading that `total_heading` has been accumulated up to. Advanced by dead
    /// reckoning while the module reports NaN.
    ///
    /// Units: radians
    counted_heading: Option<f64>,

    pose: Pose2D,

    /// Frame: field
    vel: Twist2D,

    total_heading: f64,

    is_nan: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ModuleTracker {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            timer: CycleTimer::new(clock),
            origin: Pose2D::identity(),
            last_module_pose: None,
            counted_heading: None,
            pose: Pose2D::identity(),
            vel: Twist2D::zero(),
            total_heading: 0.0,
            is_nan: false,
        }
    }

    /// Feed this cycle's reading from the module.
    pub fn apply(&mut self, reading: &ModuleReading) {
        let dt = self.timer.dt();

        let module_pose = Pose2D::from_array(reading.pose);
        let module_vel = Twist2D::from_array(reading.velocity);

        if module_pose.is_nan() || module_vel.is_nan() {
            if !self.is_nan {
                warn!("Odometry module reported NaN, dead reckoning until it recovers");
            }
            self.is_nan = true;

            if dt.is_finite() && dt > 0.0 {
                let dheading = self.vel.omega * dt;
                self.pose = self.pose.extrapolate(&self.vel, dt);
                self.total_heading += dheading;
                self.counted_heading = self.counted_heading.map(|h| h + dheading);
            }

            return;
        }

        self.is_nan = false;

        if let Some(counted) = self.counted_heading {
            self.total_heading += ang_diff(module_pose.heading, counted);
        }
        self.counted_heading = Some(module_pose.heading);
        self.last_module_pose = Some(module_pose);

        self.pose = self.origin.compose(&module_pose);
        self.vel = module_vel.rotate(self.origin.heading);

        trace!("ModuleTracker pose: {:?}, velocity: {:?}", self.pose, self.vel);
    }

    pub fn set_pose(&mut self, pose: Pose2D) {
        self.origin = match self.last_module_pose {
            Some(m) => pose.compose(&m.inverse()),
            None => pose,
        };
        self.pose = pose;
    }

    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    pub fn velocity(&self) -> Twist2D {
        self.vel
    }

    pub fn total_heading(&self) -> f64 {
        self.total_heading
    }

    pub fn is_nan(&self) -> bool {
        self.is_nan
    }
}

/// Implements `OdomSource` for a struct with a `tracker: ModuleTracker` field and a `reading`
/// method returning the module's latest reading. Extra trait items can be given in braces.
macro_rules! delegate_source {
    ($ty:ty) => {
        delegate_source!($ty, {});
    };
    ($ty:ty, { $($extra:tt)* }) => {
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

            fn total_heading(&self) -> f64 {
                self.tracker.total_heading()
            }

            fn update(&mut self) {
                let reading = self.reading();
                self.tracker.apply(&reading)
            }

            fn is_nan(&self) -> bool {
                self.tracker.is_nan()
            }

            $($extra)*
        }
    };
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
