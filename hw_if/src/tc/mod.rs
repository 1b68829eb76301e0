//! # Drive commands
//!
//! Commands which can be sent to the drive software from outside of the control loop, for
//! instance from the command line of the executable.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod drive;

pub use drive::DriveCmd;
