//! Three dead wheel odometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use log::trace;

use hw_if::{eqpt::Clock, registry::PortRegistry};

use super::{tracker::{CycleTimer, PoseTracker}, OdomError, ThreeWheelParams};
use crate::{enc_cond::EncCond, pose::Twist2D};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Odometry from two parallel dead wheels and one perpendicular dead wheel.
///
/// Rotation is recovered from the difference of the parallel wheels, so no heading sensor is
/// needed.
pub struct ThreeWheelOdom {
    params: ThreeWheelParams,

    par0: EncCond,
    par1: EncCond,
    perp: EncCond,

    timer: CycleTimer,
    tracker: PoseTracker,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ThreeWheelOdom {
    pub fn new(
        params: &ThreeWheelParams,
        ports: &mut PortRegistry,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, OdomError> {
        let separation = params.par0_y_ticks - params.par1_y_ticks;
        if !separation.is_finite() || separation == 0.0 {
            return Err(OdomError::InvalidParams(
                "the parallel wheels must have different lateral offsets".into(),
            ));
        }

        if !(params.in_per_tick.is_finite() && params.in_per_tick != 0.0) {
            return Err(OdomError::InvalidParams(format!(
                "in_per_tick must be finite and non-zero, found {}",
                params.in_per_tick
            )));
        }

        Ok(Self {
            params: params.clone(),
            par0: EncCond::from_cfg(&params.par0, ports)?,
            par1: EncCond::from_cfg(&params.par1, ports)?,
            perp: EncCond::from_cfg(&params.perp, ports)?,
            timer: CycleTimer::new(clock),
            tracker: PoseTracker::default(),
        })
    }

    /// Solve the wheel measurements for the robot-frame motion.
    ///
    /// `d0`, `d1` and `dp` are either deltas (ticks) or velocities (ticks/s).
    fn solve(&self, d0: f64, d1: f64, dp: f64) -> Twist2D {
        let y0 = self.params.par0_y_ticks;
        let y1 = self.params.par1_y_ticks;
        let xp = self.params.perp_x_ticks;
        let k = self.params.in_per_tick;

        Twist2D::new(
            (y0 * d1 - y1 * d0) / (y0 - y1) * k,
            (xp * (d1 - d0) / (y0 - y1) + dp) * k,
            (d0 - d1) / (y0 - y1),
        )
    }

    fn update_impl(&mut self) {
        let dt = self.timer.dt();

        let s0 = self.par0.update(dt);
        let s1 = self.par1.update(dt);
        let sp = self.perp.update(dt);

        let incr = self.solve(s0.delta as f64, s1.delta as f64, sp.delta as f64);
        let vel = self.solve(s0.velocity, s1.velocity, sp.velocity);

        trace!("ThreeWheelOdom increment: {:?}, velocity: {:?}", incr, vel);

        self.tracker.apply(&incr, &vel);
    }
}

tracked_source!(ThreeWheelOdom);

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{enc_cond::EncoderCfg, odom::OdomSource, sim::fake::FakeEncoder};
    use hw_if::eqpt::ManualClock;

    fn params() -> ThreeWheelParams {
        ThreeWheelParams {
            par0: EncoderCfg { port: "par0".into(), reversed: false },
            par1: EncoderCfg { port: "par1".into(), reversed: false },
            perp: EncoderCfg { port: "perp".into(), reversed: false },
            par0_y_ticks: 2000.0,
            par1_y_ticks: -2000.0,
            perp_x_ticks: 1000.0,
            in_per_tick: 0.002,
        }
    }

    fn ports() -> (PortRegistry, [FakeEncoder; 3]) {
        let encs = [FakeEncoder::default(), FakeEncoder::default(), FakeEncoder::default()];

        let mut ports = PortRegistry::new();
        ports.add_encoder("par0", Box::new(encs[0].clone()));
        ports.add_encoder("par1", Box::new(encs[1].clone()));
        ports.add_encoder("perp", Box::new(encs[2].clone()));

        (ports, encs)
    }

    #[test]
    fn test_equal_offsets_rejected() {
        let (mut ports, _) = ports();
        let mut p = params();
        p.par1_y_ticks = p.par0_y_ticks;

        let res = ThreeWheelOdom::new(&p, &mut ports, Rc::new(ManualClock::new(0.0)));
        assert!(matches!(res, Err(OdomError::InvalidParams(_))));
    }

    #[test]
    fn test_solve() {
        let (mut ports, _) = ports();
        let odom = ThreeWheelOdom::new(&params(), &mut ports, Rc::new(ManualClock::new(0.0)))
            .unwrap();

        // Pure translation forward: both parallel wheels see the same motion
        let t = odom.solve(1000.0, 1000.0, 0.0);
        assert!((t.vx - 2.0).abs() < 1e-12);
        assert!(t.vy.abs() < 1e-12);
        assert!(t.omega.abs() < 1e-12);

        // Pure rotation of 0.1 rad: each wheel registers its lever arm
        let t = odom.solve(200.0, -200.0, 100.0);
        assert!(t.vx.abs() < 1e-12);
        assert!(t.vy.abs() < 1e-12);
        assert!((t.omega - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_strafe() {
        let (mut ports, encs) = ports();
        let clock = ManualClock::new(0.0);
        let mut odom = ThreeWheelOdom::new(&params(), &mut ports, Rc::new(clock.clone()))
            .unwrap();

        odom.update();
        encs[2].set(500, 0);
        clock.advance(0.05);
        odom.update();

        let pose = odom.pose();
        assert!(pose.x.abs() < 1e-12);
        assert!((pose.y - 1.0).abs() < 1e-12);
        assert_eq!(odom.total_heading(), 0.0);
    }
}
