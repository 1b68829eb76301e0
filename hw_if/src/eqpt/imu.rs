//! # Heading sensor port

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A reading from the heading sensor (usually an IMU).
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingReading {
    /// Heading of the robot, in whatever wrapped range the sensor uses.
    ///
    /// Units: radians
    pub heading: f64,

    /// Rate of change of heading. Some sensors wrap this signal as well.
    ///
    /// Units: radians/second
    pub heading_rate: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A sensor providing the robot's heading and heading rate.
pub trait HeadingPort {
    /// Read the current heading and heading rate.
    fn read(&mut self) -> HeadingReading;
}
