//! Chassis selection and per-wheel values

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{
    ChassisParams, LocoCtrlError, MecanumKinematics, TankKinematics, NUM_MECANUM_WHEELS,
    NUM_TANK_SIDES,
};
use crate::pose::Twist2D;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Kinematics of the chassis fitted to the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Chassis {
    Mecanum(MecanumKinematics),
    Tank(TankKinematics),
}

/// One value per wheel (or per side for skid-steer).
///
/// Used for both wheel velocities (inches/second) and wheel powers (-1 to +1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum WheelVels {
    /// Left front, left back, right back, right front
    Mecanum([f64; NUM_MECANUM_WHEELS]),

    /// Left, right
    Tank([f64; NUM_TANK_SIDES]),
}

/// Per-wheel power demands in [-1, 1].
pub type WheelPowers = WheelVels;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Chassis {
    pub fn from_params(params: &ChassisParams) -> Result<Self, LocoCtrlError> {
        Ok(match params {
            ChassisParams::Mecanum(p) => Chassis::Mecanum(MecanumKinematics::new(p)?),
            ChassisParams::Tank(p) => Chassis::Tank(TankKinematics::new(p)?),
        })
    }

    /// Number of independently commanded wheel groups.
    pub fn num_wheels(&self) -> usize {
        match self {
            Chassis::Mecanum(_) => NUM_MECANUM_WHEELS,
            Chassis::Tank(_) => NUM_TANK_SIDES,
        }
    }

    /// True if the chassis can translate in any direction.
    pub fn is_holonomic(&self) -> bool {
        matches!(self, Chassis::Mecanum(_))
    }

    pub fn zeros(&self) -> WheelVels {
        match self {
            Chassis::Mecanum(_) => WheelVels::Mecanum([0.0; NUM_MECANUM_WHEELS]),
            Chassis::Tank(_) => WheelVels::Tank([0.0; NUM_TANK_SIDES]),
        }
    }

    /// Chassis twist (robot frame) to wheel velocities.
    pub fn inverse(&self, twist: &Twist2D) -> WheelVels {
        match self {
            Chassis::Mecanum(k) => WheelVels::Mecanum(k.inverse(twist)),
            Chassis::Tank(k) => WheelVels::Tank(k.inverse(twist)),
        }
    }

    /// Wheel velocities to chassis twist (robot frame).
    pub fn forward(&self, wheels: &WheelVels) -> Result<Twist2D, LocoCtrlError> {
        match (self, wheels) {
            (Chassis::Mecanum(k), WheelVels::Mecanum(w)) => Ok(k.forward(w)),
            (Chassis::Tank(k), WheelVels::Tank(w)) => Ok(k.forward(w)),
            _ => Err(LocoCtrlError::WrongWheelCount {
                expected: self.num_wheels(),
                found: wheels.len(),
            }),
        }
    }

    /// Mix a manual drive request into raw (unnormalised) wheel powers.
    ///
    /// `x` forwards, `y` leftwards, `turn` anticlockwise. Skid-steer ignores `y`.
    pub fn mix(&self, x: f64, y: f64, turn: f64) -> WheelVels {
        match self {
            Chassis::Mecanum(_) => WheelVels::Mecanum([
                x - y - turn,
                x + y - turn,
                x - y + turn,
                x + y + turn,
            ]),
            Chassis::Tank(_) => WheelVels::Tank([x - turn, x + turn]),
        }
    }
}

impl WheelVels {
    pub fn values(&self) -> &[f64] {
        match self {
            WheelVels::Mecanum(w) => w,
            WheelVels::Tank(w) => w,
        }
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        match self {
            WheelVels::Mecanum(w) => w,
            WheelVels::Tank(w) => w,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Apply `f` to every wheel value.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> WheelVels {
        let mut out = *self;
        for v in out.values_mut() {
            *v = f(*v);
        }
        out
    }

    /// Largest absolute value over all wheels.
    pub fn max_abs(&self) -> f64 {
        self.values().iter().fold(0.0, |m: f64, v| m.max(v.abs()))
    }
}
