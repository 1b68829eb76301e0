//! # External localisation module ports
//!
//! Absolute position modules and optical correlation sensors compute a pose on board and report
//! it directly. Their readings use plain `[x, y, heading]` arrays so that this crate stays free of
//! any maths library.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A reading from an external localisation module.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleReading {
    /// Pose of the robot in the module's own field frame, `[x, y, heading]`.
    ///
    /// Units: inches, inches, radians
    pub pose: [f64; 3],

    /// Field frame velocity, `[vx, vy, omega]`.
    ///
    /// Units: inches/second, inches/second, radians/second
    pub velocity: [f64; 3],

    /// Field frame acceleration, `[ax, ay, alpha]`.
    ///
    /// Units: inches/second^2, inches/second^2, radians/second^2
    pub acceleration: [f64; 3],
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An external module which reports an absolute pose.
///
/// The module may occasionally report NaN in any field, consumers must tolerate this.
pub trait PoseModulePort {
    /// Read the latest pose, velocity and acceleration from the module.
    fn read(&mut self) -> ModuleReading;
}

/// An optical correlation sensor, which additionally exposes its calibration.
pub trait OpticalPort: PoseModulePort {
    /// Linear scale factor applied by the sensor.
    fn linear_scale(&self) -> f64;

    /// Set the linear scale factor applied by the sensor.
    fn set_linear_scale(&mut self, scale: f64);

    /// Angular scale factor applied by the sensor.
    fn angular_scale(&self) -> f64;

    /// Set the angular scale factor applied by the sensor.
    fn set_angular_scale(&mut self, scale: f64);

    /// Mounting offset of the sensor relative to the robot centre, `[x, y, heading]`.
    fn offset(&self) -> [f64; 3];

    /// Set the mounting offset of the sensor relative to the robot centre.
    fn set_offset(&mut self, offset: [f64; 3]);
}
