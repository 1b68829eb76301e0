//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the drive controller
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    pub holonomic: HolonomicGains,

    pub ramsete: RamseteGains,

    pub turn: TurnGains,

    pub feedforward: FeedforwardCoeffs,

    // ---- HARDWARE ----

    /// Actuator port names of each wheel group, in the chassis' wheel order.
    ///
    /// A group holds all motors driven with the same command, e.g. the ganged motors on one side
    /// of a skid-steer chassis.
    pub wheel_ports: Vec<Vec<String>>,

    /// Supply voltage port name
    pub voltage_port: String,

    // ---- POSE PERSISTENCE ----

    /// Key the pose is saved under when a trajectory finishes.
    #[serde(default = "default_persist_key")]
    pub persist_key: String,

    /// If true the pose saved by a previous run is restored at start up.
    #[serde(default = "default_restore_pose")]
    pub restore_pose: bool,
}

/// Gains of the holonomic (mecanum) controller.
#[derive(Deserialize, Debug, Clone, Copy, Default)]
pub struct HolonomicGains {
    /// Units: 1/second
    pub axial_gain: f64,

    /// Units: 1/second
    pub lateral_gain: f64,

    /// Units: 1/second
    pub heading_gain: f64,

    pub axial_vel_gain: f64,

    pub lateral_vel_gain: f64,

    pub heading_vel_gain: f64,
}

/// Gains of the Ramsete (skid-steer path) controller.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct RamseteGains {
    /// Damping ratio, between 0 and 1
    pub zeta: f64,

    /// Aggressiveness, normalised by the track width squared.
    pub b_bar: f64,
}

/// Gains of the skid-steer turn controller.
#[derive(Deserialize, Debug, Clone, Copy, Default)]
pub struct TurnGains {
    /// Units: 1/second
    pub turn_gain: f64,

    pub turn_vel_gain: f64,
}

/// Motor feedforward coefficients.
#[derive(Deserialize, Debug, Clone, Copy, Default)]
pub struct FeedforwardCoeffs {
    /// Static friction voltage
    ///
    /// Units: volts
    pub ks: f64,

    /// Units: volts/(inch/second)
    pub kv: f64,

    /// Units: volts/(inch/second^2)
    pub ka: f64,
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_persist_key() -> String {
    super::DEFAULT_PERSIST_KEY.into()
}

fn default_restore_pose() -> bool {
    true
}
