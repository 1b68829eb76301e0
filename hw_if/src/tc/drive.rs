//! # Manual drive commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A manual (non-trajectory) drive command.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
pub enum DriveCmd {
    /// Drive with the given normalised powers.
    ///
    /// The powers are mixed into wheel powers by the chassis kinematics, so `y` is ignored by
    /// skid-steer chassis.
    #[structopt(name = "drive")]
    Drive {
        /// Forward power, positive forwards.
        #[structopt(allow_hyphen_values = true)]
        x: f64,

        /// Lateral power, positive to the left.
        #[structopt(allow_hyphen_values = true)]
        y: f64,

        /// Turn power, positive anticlockwise (right hand rule about Z+).
        #[structopt(allow_hyphen_values = true)]
        turn: f64,
    },

    /// Stop the robot, setting all wheel powers to zero.
    #[structopt(name = "stop")]
    Stop,
}
