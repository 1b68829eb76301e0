//! # Encoder port

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A raw reading from a single encoder channel.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderReading {
    /// Accumulated position of the channel.
    ///
    /// Units: ticks
    pub position: i32,

    /// Velocity hint reported by the hardware. This is a narrow counter which can wrap at high
    /// speed, so it must be reconciled against the position before being trusted.
    ///
    /// Units: ticks/second
    pub velocity: i32,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A single encoder channel, either a dead wheel or the encoder of a drive motor.
pub trait EncoderPort {
    /// Read the current position and velocity hint of the channel.
    fn read(&mut self) -> EncoderReading;
}
