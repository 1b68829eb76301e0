//! # Equipment Interface
//!
//! This module defines the port traits and reading structures exchanged with the robot's
//! equipment. All ports are polled once per control cycle, there is no buffering between cycles.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod act;
pub mod clock;
pub mod enc;
pub mod imu;
pub mod module;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use act::{ActuatorPort, VoltagePort};
pub use clock::{Clock, ManualClock, SystemClock};
pub use enc::{EncoderPort, EncoderReading};
pub use imu::{HeadingPort, HeadingReading};
pub use module::{ModuleReading, OpticalPort, PoseModulePort};
