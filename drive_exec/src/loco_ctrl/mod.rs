//! # Locomotion control module
//!
//! Maps between chassis velocities and per-wheel velocities for the supported chassis, and
//! mixes manual drive requests into wheel powers.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_mecanum;
mod calc_skid_steer;
mod chassis;
mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use calc_mecanum::*;
pub use calc_skid_steer::*;
pub use chassis::*;
pub use cmd::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of wheels on a mecanum chassis.
pub const NUM_MECANUM_WHEELS: usize = 4;

/// Number of independently driven sides on a skid-steer chassis.
pub const NUM_TANK_SIDES: usize = 2;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LocoCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LocoCtrlError {
    #[error("Invalid chassis geometry: {0}")]
    InvalidGeometry(String),

    #[error("Expected {expected} wheel values for this chassis, found {found}")]
    WrongWheelCount { expected: usize, found: usize },

    #[error("Recieved an invalid drive command: {0:?}")]
    InvalidCmd(LocoCmd),

    #[error("LocoCtrl has not been initialised")]
    NotInit,
}
