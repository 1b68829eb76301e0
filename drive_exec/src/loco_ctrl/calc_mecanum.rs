//! Mecanum chassis kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{LocoCtrlError, MecanumParams, NUM_MECANUM_WHEELS};
use crate::pose::Twist2D;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics of a four wheel mecanum chassis.
///
/// Wheel values are ordered left front, left back, right back, right front and are linear wheel
/// velocities (or displacements) along the robot's X axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MecanumKinematics {
    /// Combined track width and wheelbase.
    ///
    /// Units: inches
    radius: f64,

    lateral_multiplier: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MecanumKinematics {
    pub fn new(params: &MecanumParams) -> Result<Self, LocoCtrlError> {
        let radius = (params.track_width + params.wheelbase) / 2.0;

        if !(radius.is_finite() && radius > 0.0) {
            return Err(LocoCtrlError::InvalidGeometry(format!(
                "track width plus wheelbase must be positive, found {} and {}",
                params.track_width, params.wheelbase
            )));
        }
        if !(params.lateral_multiplier.is_finite() && params.lateral_multiplier != 0.0) {
            return Err(LocoCtrlError::InvalidGeometry(format!(
                "lateral multiplier must be non-zero, found {}",
                params.lateral_multiplier
            )));
        }

        Ok(Self {
            radius,
            lateral_multiplier: params.lateral_multiplier,
        })
    }

    /// Chassis twist to wheel velocities.
    pub fn inverse(&self, twist: &Twist2D) -> [f64; NUM_MECANUM_WHEELS] {
        let lat = self.lateral_multiplier * twist.vy;
        let rot = self.radius * twist.omega;

        [
            twist.vx - lat - rot,
            twist.vx + lat - rot,
            twist.vx - lat + rot,
            twist.vx + lat + rot,
        ]
    }

    /// Wheel velocities to chassis twist.
    pub fn forward(&self, wheels: &[f64; NUM_MECANUM_WHEELS]) -> Twist2D {
        let [lf, lb, rb, rf] = *wheels;

        Twist2D::new(
            (lf + lb + rb + rf) / 4.0,
            (-lf + lb - rb + rf) / (4.0 * self.lateral_multiplier),
            (-lf - lb + rb + rf) / (4.0 * self.radius),
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn assert_twist_close(a: &Twist2D, b: &Twist2D) {
        assert!((a.vx - b.vx).abs() < 1e-12, "{:?} != {:?}", a, b);
        assert!((a.vy - b.vy).abs() < 1e-12, "{:?} != {:?}", a, b);
        assert!((a.omega - b.omega).abs() < 1e-12, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_round_trip() {
        let kin = MecanumKinematics::new(&MecanumParams {
            track_width: 14.5,
            wheelbase: 13.0,
            lateral_multiplier: 1.2,
        })
        .unwrap();

        let twists = [
            Twist2D::new(0.0, 0.0, 0.0),
            Twist2D::new(30.0, 0.0, 0.0),
            Twist2D::new(0.0, -20.0, 0.0),
            Twist2D::new(0.0, 0.0, 2.5),
            Twist2D::new(12.0, 7.0, -1.1),
            Twist2D::new(-40.0, 3.0, 0.4),
        ];

        for t in twists.iter() {
            assert_twist_close(&kin.forward(&kin.inverse(t)), t);
        }
    }

    #[test]
    fn test_wheel_layout() {
        let kin = MecanumKinematics::new(&MecanumParams {
            track_width: 10.0,
            wheelbase: 10.0,
            lateral_multiplier: 1.0,
        })
        .unwrap();

        // Turning anticlockwise drives the right side forward
        assert_eq!(kin.inverse(&Twist2D::new(0.0, 0.0, 1.0)), [-10.0, -10.0, 10.0, 10.0]);

        // Strafing left
        assert_eq!(kin.inverse(&Twist2D::new(0.0, 1.0, 0.0)), [-1.0, 1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_invalid_geometry() {
        let res = MecanumKinematics::new(&MecanumParams {
            track_width: 0.0,
            wheelbase: 0.0,
            lateral_multiplier: 1.0,
        });

        assert!(matches!(res, Err(LocoCtrlError::InvalidGeometry(_))));
    }
}
