//! # Pose module
//!
//! Planar (SE(2)) pose and twist types used throughout localisation and control.
//!
//! Poses are stored with their heading wrapped into [0, 2pi). The unwrapped heading is tracked
//! separately by each odometry source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use util::maths::wrap_2pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Below this heading increment the pose exponential switches to its Taylor expansion.
///
/// Units: radians
pub const SMALL_ANGLE_RAD: f64 = 0.001;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The position and heading of the robot.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose2D {
    /// Units: inches
    pub x: f64,

    /// Units: inches
    pub y: f64,

    /// Anticlockwise angle from the X axis.
    ///
    /// Units: radians, in [0, 2pi)
    pub heading: f64,
}

/// A chassis velocity, or a robot-frame increment when integrating.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Twist2D {
    /// Units: inches/second
    pub vx: f64,

    /// Units: inches/second
    pub vy: f64,

    /// Units: radians/second
    pub omega: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2D {
    /// Create a new pose, wrapping the heading into [0, 2pi).
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            x,
            y,
            heading: wrap_2pi(heading),
        }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    /// Build a pose from an `[x, y, heading]` array as reported by external modules.
    ///
    /// The heading is not wrapped so that NaNs survive for the caller to detect.
    pub fn from_array(arr: [f64; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            heading: arr[2],
        }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn rotation(&self) -> Rotation2<f64> {
        Rotation2::new(self.heading)
    }

    /// Apply `other` in the frame of `self`, i.e. `self ∘ other`.
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        let pos = self.position() + self.rotation() * other.position();

        Pose2D::new(pos[0], pos[1], self.heading + other.heading)
    }

    pub fn inverse(&self) -> Pose2D {
        let pos = self.rotation().inverse() * -self.position();

        Pose2D::new(pos[0], pos[1], -self.heading)
    }

    /// The pose of `self` expressed relative to `base`, i.e. `base⁻¹ ∘ self`.
    ///
    /// When `self` is a target and `base` the measured pose this is the tracking error in the
    /// robot frame.
    pub fn minus(&self, base: &Pose2D) -> Pose2D {
        base.inverse().compose(self)
    }

    /// Integrate a robot-frame increment onto this pose using the pose exponential.
    pub fn integrate(&self, incr: &Twist2D) -> Pose2D {
        self.compose(&exp(incr))
    }

    /// Dead-reckon forward by `dt` seconds with the field-frame velocity `vel`.
    pub fn extrapolate(&self, vel: &Twist2D, dt: f64) -> Pose2D {
        Pose2D::new(
            self.x + vel.vx * dt,
            self.y + vel.vy * dt,
            self.heading + vel.omega * dt,
        )
    }

    pub fn is_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.heading.is_nan()
    }
}

impl Twist2D {
    pub fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    /// Rotate the linear part of the twist by `angle`.
    ///
    /// Rotating by a pose's heading takes a robot-frame velocity into the field frame, rotating by
    /// the negative heading goes back.
    pub fn rotate(&self, angle: f64) -> Twist2D {
        let lin = Rotation2::new(angle) * Vector2::new(self.vx, self.vy);

        Twist2D::new(lin[0], lin[1], self.omega)
    }

    pub fn scale(&self, k: f64) -> Twist2D {
        Twist2D::new(self.vx * k, self.vy * k, self.omega * k)
    }

    pub fn is_nan(&self) -> bool {
        self.vx.is_nan() || self.vy.is_nan() || self.omega.is_nan()
    }
}

impl Add for Twist2D {
    type Output = Twist2D;

    fn add(self, rhs: Twist2D) -> Twist2D {
        Twist2D::new(self.vx + rhs.vx, self.vy + rhs.vy, self.omega + rhs.omega)
    }
}

impl Sub for Twist2D {
    type Output = Twist2D;

    fn sub(self, rhs: Twist2D) -> Twist2D {
        Twist2D::new(self.vx - rhs.vx, self.vy - rhs.vy, self.omega - rhs.omega)
    }
}

impl Neg for Twist2D {
    type Output = Twist2D;

    fn neg(self) -> Twist2D {
        self.scale(-1.0)
    }
}

impl Mul<f64> for Twist2D {
    type Output = Twist2D;

    fn mul(self, rhs: f64) -> Twist2D {
        self.scale(rhs)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The pose exponential, mapping a robot-frame increment `(dx, dy, dθ)` into the displacement of
/// a constant curvature arc.
pub fn exp(incr: &Twist2D) -> Pose2D {
    let dtheta = incr.omega;

    // s = sin(θ)/θ, c = (1 - cos(θ))/θ
    let (s, c) = if dtheta.abs() < SMALL_ANGLE_RAD {
        (1.0 - dtheta * dtheta / 6.0, dtheta / 2.0)
    }
    else {
        (dtheta.sin() / dtheta, (1.0 - dtheta.cos()) / dtheta)
    };

    Pose2D::new(
        s * incr.vx - c * incr.vy,
        c * incr.vx + s * incr.vy,
        dtheta,
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use util::maths::ang_diff;

    fn assert_pose_close(a: &Pose2D, b: &Pose2D, tol: f64) {
        assert!((a.x - b.x).abs() < tol, "x: {} != {}", a.x, b.x);
        assert!((a.y - b.y).abs() < tol, "y: {} != {}", a.y, b.y);
        assert!(
            ang_diff(a.heading, b.heading).abs() < tol,
            "heading: {} != {}",
            a.heading,
            b.heading
        );
    }

    /// Integrate `(v, 0, omega)` over `n` cycles and compare against the closed form arc.
    fn check_arc(v: f64, omega: f64, dt: f64, n: usize) {
        let incr = Twist2D::new(v * dt, 0.0, omega * dt);
        let mut pose = Pose2D::identity();

        for _ in 0..n {
            pose = pose.integrate(&incr);
        }

        let t = dt * n as f64;
        let expected = if omega.abs() < 1e-12 {
            Pose2D::new(v * t, 0.0, 0.0)
        }
        else {
            let radius = v / omega;
            let half = (omega * t / 2.0).sin();
            Pose2D::new(
                radius * (omega * t).sin(),
                2.0 * radius * half * half,
                omega * t,
            )
        };

        assert_pose_close(&pose, &expected, 1e-9);
    }

    #[test]
    fn test_integrate_arc() {
        // Straight line
        check_arc(12.0, 0.0, 0.01, 100);

        // Near zero curvature goes through the small angle branch each cycle
        check_arc(12.0, 1e-6, 0.01, 100);
        check_arc(-8.0, 0.05, 0.01, 200);

        // Large rates, including more than a full revolution
        check_arc(30.0, 4.0, 0.01, 100);
        check_arc(10.0, -9.0, 0.02, 100);
    }

    #[test]
    fn test_small_angle_continuity() {
        // Either side of the branch the two formulations should agree closely
        let below = exp(&Twist2D::new(1.0, 0.5, SMALL_ANGLE_RAD * 0.999));
        let above = exp(&Twist2D::new(1.0, 0.5, SMALL_ANGLE_RAD * 1.001));

        assert!((below.x - above.x).abs() < 1e-6);
        assert!((below.y - above.y).abs() < 1e-6);
    }

    #[test]
    fn test_compose_identity_inverse() {
        let a = Pose2D::new(3.0, -2.0, 1.2);
        let b = Pose2D::new(-1.0, 4.0, 5.9);
        let c = Pose2D::new(0.5, 0.25, -0.7);

        assert_pose_close(&a.compose(&Pose2D::identity()), &a, 1e-12);
        assert_pose_close(&Pose2D::identity().compose(&a), &a, 1e-12);
        assert_pose_close(&a.compose(&a.inverse()), &Pose2D::identity(), 1e-12);

        // Associative
        assert_pose_close(
            &a.compose(&b).compose(&c),
            &a.compose(&b.compose(&c)),
            1e-9,
        );

        // Not commutative
        let ab = a.compose(&b);
        let ba = b.compose(&a);
        assert!((ab.x - ba.x).abs() > 1e-3 || (ab.y - ba.y).abs() > 1e-3);

        // minus undoes compose
        assert_pose_close(&a.compose(&b).minus(&a), &b, 1e-9);
    }

    #[test]
    fn test_heading_storage() {
        let p = Pose2D::new(0.0, 0.0, -0.5);
        assert!((p.heading - (std::f64::consts::TAU - 0.5)).abs() < 1e-12);

        let q = p.compose(&Pose2D::new(0.0, 0.0, 1.0));
        assert!((q.heading - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_exp_deterministic() {
        let incr = Twist2D::new(0.123456789, -0.987654321, 0.0004);

        assert_eq!(exp(&incr), exp(&incr));
        assert_eq!(
            Pose2D::new(1.0, 2.0, 3.0).integrate(&incr),
            Pose2D::new(1.0, 2.0, 3.0).integrate(&incr)
        );
    }

    #[test]
    fn test_twist_rotate() {
        let t = Twist2D::new(1.0, 0.0, 0.3).rotate(std::f64::consts::FRAC_PI_2);

        assert!(t.vx.abs() < 1e-12);
        assert!((t.vy - 1.0).abs() < 1e-12);
        assert_eq!(t.omega, 0.3);

        let back = t.rotate(-std::f64::consts::FRAC_PI_2);
        assert!((back.vx - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_extrapolate() {
        let p = Pose2D::new(1.0, 1.0, 0.0)
            .extrapolate(&Twist2D::new(2.0, -1.0, 0.5), 0.1);

        assert_pose_close(&p, &Pose2D::new(1.2, 0.9, 0.05), 1e-12);
    }
}
