//! # Odometry module
//!
//! Odometry sources estimate the pose and velocity of the robot once per control cycle. All
//! sources share the [`OdomSource`] interface so that the rest of the software doesn't care which
//! sensors are fitted. The source in use is selected by the `kind` tag of the odometry parameter
//! file and built with [`build`] or [`configure`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

#[macro_use]
mod tracker;
#[macro_use]
mod delegate;

mod abs_module;
mod mecanum;
mod optical;
mod params;
mod tank;
mod three_wheel;
mod two_wheel;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use log::{error, info};
use serde::Serialize;
use thiserror::Error;

use hw_if::{
    eqpt::Clock,
    registry::{PortError, PortRegistry},
};
use util::params::LoadError;

use crate::pose::{Pose2D, Twist2D};

pub use abs_module::AbsModuleOdom;
pub use mecanum::MecanumOdom;
pub use optical::{OpticalOdom, OPTICAL_SCALE_MAX, OPTICAL_SCALE_MIN};
pub use params::*;
pub use tank::TankOdom;
pub use three_wheel::ThreeWheelOdom;
pub use two_wheel::TwoWheelOdom;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Interface shared by all odometry sources.
pub trait OdomSource {
    /// Redefine the origin so that the current pose becomes `pose`.
    ///
    /// The total heading is not reset.
    fn set_pose(&mut self, pose: Pose2D);

    /// The current pose estimate.
    fn pose(&self) -> Pose2D;

    /// The current velocity in the field frame.
    fn velocity(&self) -> Twist2D;

    /// The current velocity in the robot frame.
    fn velocity_robot(&self) -> Twist2D {
        self.velocity().rotate(-self.pose().heading)
    }

    /// The unwrapped heading accumulated since the source was built.
    ///
    /// Units: radians
    fn total_heading(&self) -> f64;

    /// Advance the estimate by one control cycle.
    fn update(&mut self);

    fn is_configured(&self) -> bool {
        true
    }

    /// True if the last update had to dead reckon because the sensor reported NaN.
    fn is_nan(&self) -> bool {
        false
    }

    /// Access to the optical sensor calibration, if this source has one.
    fn as_optical_mut(&mut self) -> Option<&mut OpticalOdom> {
        None
    }

    /// Snapshot of the source for diagnostics and archiving.
    fn state(&self) -> OdomState {
        let pose = self.pose();
        let vel = self.velocity();

        OdomState {
            x: pose.x,
            y: pose.y,
            heading: pose.heading,
            vx: vel.vx,
            vy: vel.vy,
            omega: vel.omega,
            total_heading: self.total_heading(),
            is_nan: self.is_nan(),
        }
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Diagnostic snapshot of an odometry source.
///
/// Flat so that it can be archived as a CSV row.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct OdomState {
    /// Units: inches
    pub x: f64,
    /// Units: inches
    pub y: f64,
    /// Units: radians
    pub heading: f64,

    /// Units: inches/second, Frame: field
    pub vx: f64,
    /// Units: inches/second, Frame: field
    pub vy: f64,
    /// Units: radians/second
    pub omega: f64,

    /// Units: radians
    pub total_heading: f64,

    pub is_nan: bool,
}

/// Source used when odometry could not be configured.
///
/// Reports the identity pose and zero velocity forever.
#[derive(Debug, Default)]
pub struct UnconfiguredOdom;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while configuring an odometry source.
#[derive(Debug, Error)]
pub enum OdomError {
    #[error("Odometry port unavailable: {0}")]
    Port(#[from] PortError),

    #[error("Could not load the odometry parameters: {0}")]
    ParamLoad(#[from] LoadError),

    #[error("Invalid odometry parameters: {0}")]
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OdomSource for UnconfiguredOdom {
    fn set_pose(&mut self, _pose: Pose2D) {}

    fn pose(&self) -> Pose2D {
        Pose2D::identity()
    }

    fn velocity(&self) -> Twist2D {
        Twist2D::zero()
    }

    fn total_heading(&self) -> f64 {
        0.0
    }

    fn update(&mut self) {}

    fn is_configured(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the odometry source described by `params`, taking its ports out of the registry.
pub fn build(
    params: &OdomParams,
    ports: &mut PortRegistry,
    clock: Rc<dyn Clock>,
) -> Result<Box<dyn OdomSource>, OdomError> {
    let source: Box<dyn OdomSource> = match params {
        OdomParams::TwoWheel(p) => Box::new(TwoWheelOdom::new(p, ports, clock)?),
        OdomParams::ThreeWheel(p) => Box::new(ThreeWheelOdom::new(p, ports, clock)?),
        OdomParams::Mecanum(p) => Box::new(MecanumOdom::new(p, ports, clock)?),
        OdomParams::Tank(p) => Box::new(TankOdom::new(p, ports, clock)?),
        OdomParams::AbsModule(p) => Box::new(AbsModuleOdom::new(p, ports, clock)?),
        OdomParams::Optical(p) => Box::new(OpticalOdom::new(p, ports, clock)?),
    };

    Ok(source)
}

/// Build the odometry source from possibly failed parameter loading.
///
/// Any error is logged and an [`UnconfiguredOdom`] returned in place of the source, so the rest
/// of the robot stays usable.
pub fn configure(
    params: Result<OdomParams, LoadError>,
    ports: &mut PortRegistry,
    clock: Rc<dyn Clock>,
) -> Box<dyn OdomSource> {
    let result = params
        .map_err(OdomError::from)
        .and_then(|p| build(&p, ports, clock).map(|s| (p.kind_name(), s)));

    match result {
        Ok((kind, source)) => {
            info!("Odometry configured with the {} source", kind);
            source
        }
        Err(e) => {
            error!("Odometry is not configured: {}", e);
            Box::new(UnconfiguredOdom)
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
