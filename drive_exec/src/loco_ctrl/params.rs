//! Parameters structures for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    pub chassis: ChassisParams,

    // ---- MANUAL DRIVING ----

    /// Scale applied to manual wheel powers after normalisation, clamped to [0, 1].
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,

    /// Interpret manual `x` and `y` in the field frame rather than the robot frame.
    #[serde(default)]
    pub field_centric: bool,

    /// Heading the field frame is taken relative to when driving field centric.
    #[serde(default)]
    pub field_centric_ref: FieldCentricRef,
}

/// Geometry of a mecanum chassis.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct MecanumParams {
    /// Distance between the left and right wheel contact points.
    ///
    /// Units: inches
    pub track_width: f64,

    /// Distance between the front and back wheel contact points.
    ///
    /// Units: inches
    pub wheelbase: f64,

    /// Ratio of forward to lateral wheel travel for the same roller motion. Tuned empirically,
    /// 1.0 for ideal rollers.
    #[serde(default = "default_lateral_multiplier")]
    pub lateral_multiplier: f64,
}

/// Geometry of a skid-steer chassis.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct TankParams {
    /// Effective distance between the left and right sides.
    ///
    /// Units: inches
    pub track_width: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The chassis fitted to the robot.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChassisParams {
    Mecanum(MecanumParams),
    Tank(TankParams),
}

/// Which heading field centric driving is relative to.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FieldCentricRef {
    /// The heading of the robot now.
    Current,

    /// The heading of the robot when field centric mode was enabled.
    Initial,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for FieldCentricRef {
    fn default() -> Self {
        FieldCentricRef::Current
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_speed_multiplier() -> f64 {
    1.0
}

fn default_lateral_multiplier() -> f64 {
    1.0
}
