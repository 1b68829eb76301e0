//! Mecanum drive encoder odometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use log::trace;

use hw_if::{eqpt::Clock, registry::PortRegistry};

use super::{tracker::{CycleTimer, PoseTracker}, MecanumOdomParams, OdomError};
use crate::{enc_cond::EncCond, loco_ctrl::MecanumKinematics};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Odometry from the four drive motor encoders of a mecanum chassis.
pub struct MecanumOdom {
    in_per_tick: f64,
    kinematics: MecanumKinematics,

    /// Left front, left back, right back, right front
    wheels: [EncCond; 4],

    timer: CycleTimer,
    tracker: PoseTracker,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MecanumOdom {
    pub fn new(
        params: &MecanumOdomParams,
        ports: &mut PortRegistry,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, OdomError> {
        let kinematics = MecanumKinematics::new(&params.kinematics)
            .map_err(|e| OdomError::InvalidParams(e.to_string()))?;

        if !(params.in_per_tick.is_finite() && params.in_per_tick != 0.0) {
            return Err(OdomError::InvalidParams(format!(
                "in_per_tick must be finite and non-zero, found {}",
                params.in_per_tick
            )));
        }

        Ok(Self {
            in_per_tick: params.in_per_tick,
            kinematics,
            wheels: [
                EncCond::from_cfg(&params.left_front, ports)?,
                EncCond::from_cfg(&params.left_back, ports)?,
                EncCond::from_cfg(&params.right_back, ports)?,
                EncCond::from_cfg(&params.right_front, ports)?,
            ],
            timer: CycleTimer::new(clock),
            tracker: PoseTracker::default(),
        })
    }

    fn update_impl(&mut self) {
        let dt = self.timer.dt();

        let mut deltas = [0f64; 4];
        let mut vels = [0f64; 4];

        for (i, wheel) in self.wheels.iter_mut().enumerate() {
            let s = wheel.update(dt);
            deltas[i] = s.delta as f64 * self.in_per_tick;
            vels[i] = s.velocity * self.in_per_tick;
        }

        let incr = self.kinematics.forward(&deltas);
        let vel = self.kinematics.forward(&vels);

        trace!("MecanumOdom increment: {:?}, velocity: {:?}", incr, vel);

        self.tracker.apply(&incr, &vel);
    }
}

tracked_source!(MecanumOdom);

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        enc_cond::EncoderCfg,
        loco_ctrl::MecanumParams,
        odom::OdomSource,
        pose::Twist2D,
        sim::fake::FakeEncoder,
    };
    use hw_if::eqpt::ManualClock;

    #[test]
    fn test_wheel_motion() {
        let names = ["lf", "lb", "rb", "rf"];
        let encs: Vec<FakeEncoder> = names.iter().map(|_| FakeEncoder::default()).collect();

        let mut ports = PortRegistry::new();
        for (n, e) in names.iter().zip(encs.iter()) {
            ports.add_encoder(*n, Box::new(e.clone()));
        }

        let cfg = |n: &str| EncoderCfg { port: n.into(), reversed: false };
        let params = MecanumOdomParams {
            left_front: cfg("lf"),
            left_back: cfg("lb"),
            right_back: cfg("rb"),
            right_front: cfg("rf"),
            in_per_tick: 0.01,
            kinematics: MecanumParams {
                track_width: 14.0,
                wheelbase: 12.0,
                lateral_multiplier: 1.0,
            },
        };

        let clock = ManualClock::new(0.0);
        let mut odom = MecanumOdom::new(&params, &mut ports, Rc::new(clock.clone())).unwrap();
        odom.update();

        // Wheel travel for a pure strafe of 2 inches to the left
        let kin = MecanumKinematics::new(&params.kinematics).unwrap();
        let wheels = kin.inverse(&Twist2D::new(0.0, 2.0, 0.0));
        for (e, w) in encs.iter().zip(wheels.iter()) {
            e.set((w / 0.01).round() as i32, 0);
        }

        clock.advance(0.02);
        odom.update();

        let pose = odom.pose();
        assert!(pose.x.abs() < 1e-9);
        assert!((pose.y - 2.0).abs() < 1e-9);
        assert!(odom.total_heading().abs() < 1e-12);
    }
}
