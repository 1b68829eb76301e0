//! # Trajectory controllers module
//!
//! This module provides the feedback laws used by the drive controller. Each law takes the
//! sampled trajectory target and the odometry estimate and produces a robot-frame chassis
//! command made of a velocity and an acceleration (the latter only used for feedforward).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{
    params::{HolonomicGains, RamseteGains, TurnGains},
    PoseDual,
};
use crate::pose::{Pose2D, Twist2D};
use util::maths::{ang_diff, sinc};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A chassis motion command.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ChassisCmd {
    /// Frame: robot
    pub vel: Twist2D,

    /// Frame: robot
    pub accel: Twist2D,
}

/// Error between the target and actual pose, in the robot frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct TrackingError {
    /// Units: inches
    pub x: f64,

    /// Units: inches
    pub y: f64,

    /// Units: radians
    pub heading: f64,
}

/// Feedback law for holonomic chassis.
#[derive(Debug, Copy, Clone)]
pub struct HolonomicController {
    gains: HolonomicGains,
}

/// Ramsete path following law for skid-steer chassis.
#[derive(Debug, Copy, Clone)]
pub struct RamseteController {
    zeta: f64,

    /// `b_bar` divided by the track width squared.
    b: f64,
}

/// Turn in place law for skid-steer chassis.
///
/// Only the heading is controlled, the robot is commanded as a pure rotation.
#[derive(Debug, Copy, Clone)]
pub struct TurnController {
    gains: TurnGains,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrackingError {
    /// The error of `actual` against `target`.
    pub fn between(target: &Pose2D, actual: &Pose2D) -> Self {
        let rel = target.minus(actual);

        Self {
            x: rel.x,
            y: rel.y,
            heading: ang_diff(target.heading, actual.heading),
        }
    }
}

impl HolonomicController {
    pub fn new(gains: HolonomicGains) -> Self {
        Self { gains }
    }

    /// Compute the command given the target, the actual pose and the actual robot-frame
    /// velocity.
    pub fn compute(
        &self,
        target: &PoseDual,
        pose: &Pose2D,
        vel_robot: &Twist2D,
    ) -> (ChassisCmd, TrackingError) {
        let err = TrackingError::between(&target.pose, pose);

        // Target velocity and acceleration in the target's frame
        let target_vel = target.vel.rotate(-target.pose.heading);
        let target_accel = target.accel.rotate(-target.pose.heading);

        let vel_err = target_vel - *vel_robot;
        let g = &self.gains;

        let vel = target_vel
            + Twist2D::new(
                g.axial_gain * err.x,
                g.lateral_gain * err.y,
                g.heading_gain * err.heading,
            )
            + Twist2D::new(
                g.axial_vel_gain * vel_err.vx,
                g.lateral_vel_gain * vel_err.vy,
                g.heading_vel_gain * vel_err.omega,
            );

        (ChassisCmd { vel, accel: target_accel }, err)
    }
}

impl RamseteController {
    /// Create the controller for a chassis with the given track width (inches).
    pub fn new(gains: RamseteGains, track_width: f64) -> Self {
        Self {
            zeta: gains.zeta,
            b: gains.b_bar / (track_width * track_width),
        }
    }

    pub fn compute(&self, target: &PoseDual, pose: &Pose2D) -> (ChassisCmd, TrackingError) {
        let err = TrackingError::between(&target.pose, pose);

        let v_ref = target.vel.rotate(-target.pose.heading).vx;
        let omega_ref = target.vel.omega;

        let k = 2.0 * self.zeta * (omega_ref * omega_ref + self.b * v_ref * v_ref).sqrt();

        let vel = Twist2D::new(
            v_ref * err.heading.cos() + k * err.x,
            0.0,
            omega_ref + k * err.heading + self.b * v_ref * sinc(err.heading) * err.y,
        );

        let accel_ref = target.accel.rotate(-target.pose.heading);
        let accel = Twist2D::new(accel_ref.vx, 0.0, accel_ref.omega);

        (ChassisCmd { vel, accel }, err)
    }
}

impl TurnController {
    pub fn new(gains: TurnGains) -> Self {
        Self { gains }
    }

    pub fn compute(
        &self,
        target: &PoseDual,
        pose: &Pose2D,
        vel_robot: &Twist2D,
    ) -> (ChassisCmd, TrackingError) {
        let err = TrackingError::between(&target.pose, pose);

        let omega_ref = target.vel.omega;
        let omega = omega_ref
            + self.gains.turn_gain * err.heading
            + self.gains.turn_vel_gain * (omega_ref - vel_robot.omega);

        (
            ChassisCmd {
                vel: Twist2D::new(0.0, 0.0, omega),
                accel: Twist2D::new(0.0, 0.0, target.accel.omega),
            },
            err,
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn target(pose: Pose2D, vel: Twist2D) -> PoseDual {
        PoseDual { pose, vel, accel: Twist2D::zero() }
    }

    #[test]
    fn test_holonomic_on_target() {
        let ctrl = HolonomicController::new(HolonomicGains {
            axial_gain: 2.0,
            lateral_gain: 2.0,
            heading_gain: 3.0,
            axial_vel_gain: 0.5,
            lateral_vel_gain: 0.5,
            heading_vel_gain: 0.5,
        });

        // Target heading +Y at 10 in/s, robot exactly on it
        let pose = Pose2D::new(5.0, 5.0, FRAC_PI_2);
        let t = target(pose, Twist2D::new(0.0, 10.0, 0.0));

        let (cmd, err) = ctrl.compute(&t, &pose, &Twist2D::new(10.0, 0.0, 0.0));

        assert!(err.x.abs() < 1e-12 && err.y.abs() < 1e-12 && err.heading.abs() < 1e-12);
        assert!((cmd.vel.vx - 10.0).abs() < 1e-12);
        assert!(cmd.vel.vy.abs() < 1e-12);
        assert!(cmd.vel.omega.abs() < 1e-12);
    }

    #[test]
    fn test_holonomic_corrects_error() {
        let ctrl = HolonomicController::new(HolonomicGains {
            axial_gain: 2.0,
            lateral_gain: 4.0,
            heading_gain: 3.0,
            ..Default::default()
        });

        // Robot 1 inch to the right of and behind a stationary target, heading slightly low
        let t = target(Pose2D::new(1.0, 1.0, 0.1), Twist2D::zero());
        let (cmd, err) = ctrl.compute(&t, &Pose2D::new(0.0, 0.0, 0.0), &Twist2D::zero());

        assert!((err.heading - 0.1).abs() < 1e-12);
        assert!((cmd.vel.vx - 2.0).abs() < 1e-12);
        assert!((cmd.vel.vy - 4.0).abs() < 1e-12);
        assert!((cmd.vel.omega - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_ramsete() {
        let ctrl = RamseteController::new(RamseteGains { zeta: 0.7, b_bar: 2.0 * 225.0 }, 15.0);

        // On target it reproduces the reference
        let pose = Pose2D::new(0.0, 0.0, 0.0);
        let t = target(pose, Twist2D::new(20.0, 0.0, 0.5));
        let (cmd, _) = ctrl.compute(&t, &pose);
        assert!((cmd.vel.vx - 20.0).abs() < 1e-12);
        assert!((cmd.vel.omega - 0.5).abs() < 1e-12);
        assert_eq!(cmd.vel.vy, 0.0);

        // Target to the left, robot turns towards it
        let t = target(Pose2D::new(0.0, 1.0, 0.0), Twist2D::new(20.0, 0.0, 0.0));
        let (cmd, err) = ctrl.compute(&t, &pose);
        assert!((err.y - 1.0).abs() < 1e-12);
        assert!((cmd.vel.omega - 2.0 * 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_turn_is_pure_rotation() {
        let ctrl = TurnController::new(TurnGains { turn_gain: 4.0, turn_vel_gain: 0.5 });

        let t = target(Pose2D::new(3.0, 3.0, 0.2), Twist2D::new(0.0, 0.0, 1.0));
        let (cmd, _) = ctrl.compute(&t, &Pose2D::new(0.0, 0.0, 0.0), &Twist2D::new(0.0, 0.0, 0.6));

        assert_eq!(cmd.vel.vx, 0.0);
        assert_eq!(cmd.vel.vy, 0.0);
        assert!((cmd.vel.omega - (1.0 + 0.8 + 0.2)).abs() < 1e-12);
    }
}
