//! Commands passed into LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hw_if::tc::DriveCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A manual drive command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocoCmd {
    /// Drive with the given demands, each nominally in [-1, 1].
    Manual {
        /// Forwards demand
        x: f64,

        /// Leftwards demand, ignored on skid-steer chassis
        y: f64,

        /// Anticlockwise turn demand
        turn: f64,

        /// Current heading of the robot, used for field centric driving.
        ///
        /// Units: radians
        heading: f64,
    },

    /// Zero power to all wheels.
    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCmd {
    /// Build a command from a drive telecommand and the robot's current heading.
    pub fn from_tc(cmd: &DriveCmd, heading: f64) -> Self {
        match *cmd {
            DriveCmd::Drive { x, y, turn } => LocoCmd::Manual { x, y, turn, heading },
            DriveCmd::Stop => LocoCmd::Stop,
        }
    }

    /// Determine if the command is valid (i.e. all demands are finite).
    pub fn is_valid(&self) -> bool {
        match self {
            LocoCmd::Manual { x, y, turn, heading } => {
                x.is_finite() && y.is_finite() && turn.is_finite() && heading.is_finite()
            }
            LocoCmd::Stop => true,
        }
    }
}
