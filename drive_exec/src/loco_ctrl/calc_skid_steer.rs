//! Skid steer calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{LocoCtrlError, TankParams, NUM_TANK_SIDES};
use crate::pose::Twist2D;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics of a skid-steer chassis, wheel values ordered left, right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankKinematics {
    /// Units: inches
    track_width: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TankKinematics {
    pub fn new(params: &TankParams) -> Result<Self, LocoCtrlError> {
        if !(params.track_width.is_finite() && params.track_width > 0.0) {
            return Err(LocoCtrlError::InvalidGeometry(format!(
                "track width must be positive, found {}",
                params.track_width
            )));
        }

        Ok(Self {
            track_width: params.track_width,
        })
    }

    /// Units: inches
    pub fn track_width(&self) -> f64 {
        self.track_width
    }

    /// Chassis twist to side velocities. Any lateral velocity is ignored.
    pub fn inverse(&self, twist: &Twist2D) -> [f64; NUM_TANK_SIDES] {
        let rot = twist.omega * self.track_width / 2.0;

        [twist.vx - rot, twist.vx + rot]
    }

    /// Side velocities to chassis twist.
    pub fn forward(&self, sides: &[f64; NUM_TANK_SIDES]) -> Twist2D {
        let [left, right] = *sides;

        Twist2D::new(
            (left + right) / 2.0,
            0.0,
            (right - left) / self.track_width,
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_trip() {
        let kin = TankKinematics::new(&TankParams { track_width: 15.2 }).unwrap();

        let twists = [
            Twist2D::new(0.0, 0.0, 0.0),
            Twist2D::new(25.0, 0.0, 0.0),
            Twist2D::new(-10.0, 0.0, 0.0),
            Twist2D::new(0.0, 0.0, 3.0),
            Twist2D::new(18.0, 0.0, -0.9),
            Twist2D::new(-5.0, 0.0, 1.7),
        ];

        for t in twists.iter() {
            let back = kin.forward(&kin.inverse(t));
            assert!((back.vx - t.vx).abs() < 1e-12);
            assert_eq!(back.vy, 0.0);
            assert!((back.omega - t.omega).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_track() {
        assert!(TankKinematics::new(&TankParams { track_width: -1.0 }).is_err());
    }
}
