//! Parameters structures for the odometry sources

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{enc_cond::EncoderCfg, loco_ctrl::{MecanumParams, TankParams}};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Two dead wheels plus a heading sensor.
///
/// The lever arm of each wheel is given as the number of ticks it registers per radian of
/// anticlockwise rotation about the tracking centre.
#[derive(Debug, Clone, Deserialize)]
pub struct TwoWheelParams {
    /// Wheel measuring motion along the robot's X axis.
    pub par: EncoderCfg,

    /// Wheel measuring motion along the robot's Y axis.
    pub perp: EncoderCfg,

    /// Name of the heading sensor port.
    pub heading: String,

    /// Units: ticks/radian
    pub par_y_ticks: f64,

    /// Units: ticks/radian
    pub perp_x_ticks: f64,

    /// Units: inches/tick
    pub in_per_tick: f64,
}

/// Two parallel and one perpendicular dead wheel, no heading sensor.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreeWheelParams {
    pub par0: EncoderCfg,
    pub par1: EncoderCfg,
    pub perp: EncoderCfg,

    /// Units: ticks/radian
    pub par0_y_ticks: f64,

    /// Units: ticks/radian
    pub par1_y_ticks: f64,

    /// Units: ticks/radian
    pub perp_x_ticks: f64,

    /// Units: inches/tick
    pub in_per_tick: f64,
}

/// Mecanum drive motor encoders.
#[derive(Debug, Clone, Deserialize)]
pub struct MecanumOdomParams {
    pub left_front: EncoderCfg,
    pub left_back: EncoderCfg,
    pub right_back: EncoderCfg,
    pub right_front: EncoderCfg,

    /// Units: inches/tick
    pub in_per_tick: f64,

    pub kinematics: MecanumParams,
}

/// Skid-steer drive motor encoders, averaged per side.
#[derive(Debug, Clone, Deserialize)]
pub struct TankOdomParams {
    pub left: Vec<EncoderCfg>,
    pub right: Vec<EncoderCfg>,

    /// Units: inches/tick
    pub in_per_tick: f64,

    pub kinematics: TankParams,
}

/// External absolute position module.
#[derive(Debug, Clone, Deserialize)]
pub struct AbsModuleParams {
    pub port: String,
}

/// Optical correlation sensor.
///
/// Calibration values are written to the sensor at start up when given.
#[derive(Debug, Clone, Deserialize)]
pub struct OpticalParams {
    pub port: String,

    #[serde(default)]
    pub linear_scale: Option<f64>,

    #[serde(default)]
    pub angular_scale: Option<f64>,

    /// Sensor mounting offset, `[x, y, heading]`.
    ///
    /// Units: inches, inches, radians. Frame: robot
    #[serde(default)]
    pub mounting_offset: Option<[f64; 3]>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Odometry parameters, tagged with the kind of source to build.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OdomParams {
    TwoWheel(TwoWheelParams),
    ThreeWheel(ThreeWheelParams),
    Mecanum(MecanumOdomParams),
    Tank(TankOdomParams),
    AbsModule(AbsModuleParams),
    Optical(OpticalParams),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OdomParams {
    pub fn kind_name(&self) -> &'static str {
        match self {
            OdomParams::TwoWheel(_) => "two_wheel",
            OdomParams::ThreeWheel(_) => "three_wheel",
            OdomParams::Mecanum(_) => "mecanum",
            OdomParams::Tank(_) => "tank",
            OdomParams::AbsModule(_) => "abs_module",
            OdomParams::Optical(_) => "optical",
        }
    }
}
