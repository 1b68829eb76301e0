//! Two dead wheel odometry with an external heading sensor

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{f64::consts::{PI, TAU}, rc::Rc};

use log::{trace, warn};

use hw_if::{eqpt::{Clock, HeadingPort}, registry::PortRegistry};
use util::maths::ang_diff;

use super::{tracker::{CycleTimer, PoseTracker}, OdomError, TwoWheelParams};
use crate::{enc_cond::EncCond, pose::Twist2D};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Odometry from a forward and a lateral dead wheel, with heading from a heading sensor.
pub struct TwoWheelOdom {
    params: TwoWheelParams,

    par: EncCond,
    perp: EncCond,
    heading_port: Box<dyn HeadingPort>,

    timer: CycleTimer,
    tracker: PoseTracker,

    last_heading: Option<f64>,

    /// Heading rate as reported last cycle, before any rollover correction.
    last_raw_heading_rate: Option<f64>,

    /// Units: radians/second
    heading_rate_offset: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TwoWheelOdom {
    pub fn new(
        params: &TwoWheelParams,
        ports: &mut PortRegistry,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, OdomError> {
        if !(params.in_per_tick.is_finite() && params.in_per_tick != 0.0) {
            return Err(OdomError::InvalidParams(format!(
                "in_per_tick must be finite and non-zero, found {}",
                params.in_per_tick
            )));
        }

        Ok(Self {
            params: params.clone(),
            par: EncCond::from_cfg(&params.par, ports)?,
            perp: EncCond::from_cfg(&params.perp, ports)?,
            heading_port: ports.take_heading(&params.heading)?,
            timer: CycleTimer::new(clock),
            tracker: PoseTracker::default(),
            last_heading: None,
            last_raw_heading_rate: None,
            heading_rate_offset: 0.0,
        })
    }

    fn update_impl(&mut self) {
        let heading = self.heading_port.read();

        // Leave the encoders and timer untouched so the next valid cycle picks up this cycle's
        // travel
        if !(heading.heading.is_finite() && heading.heading_rate.is_finite()) {
            warn!("Heading sensor returned an invalid reading, odometry not updated");
            return;
        }

        let dt = self.timer.dt();
        let par = self.par.update(dt);
        let perp = self.perp.update(dt);

        // The rate signal can roll over by a full turn, track the offset so the velocity term
        // doesn't jump
        if let Some(last_rate) = self.last_raw_heading_rate {
            if (heading.heading_rate - last_rate).abs() > PI {
                self.heading_rate_offset -= heading.heading_rate.signum() * TAU;
            }
        }
        self.last_raw_heading_rate = Some(heading.heading_rate);
        let heading_rate = heading.heading_rate + self.heading_rate_offset;

        let dheading = match self.last_heading {
            Some(h) => ang_diff(heading.heading, h),
            None => 0.0,
        };
        self.last_heading = Some(heading.heading);

        let k = self.params.in_per_tick;
        let par_y = self.params.par_y_ticks;
        let perp_x = self.params.perp_x_ticks;

        let incr = Twist2D::new(
            (par.delta as f64 - par_y * dheading) * k,
            (perp.delta as f64 - perp_x * dheading) * k,
            dheading,
        );
        let vel = Twist2D::new(
            (par.velocity - par_y * heading_rate) * k,
            (perp.velocity - perp_x * heading_rate) * k,
            heading_rate,
        );

        trace!("TwoWheelOdom increment: {:?}, velocity: {:?}", incr, vel);

        self.tracker.apply(&incr, &vel);
    }
}

tracked_source!(TwoWheelOdom);

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        odom::OdomSource,
        pose::Pose2D,
        sim::fake::{FakeEncoder, FakeHeading},
    };
    use crate::enc_cond::EncoderCfg;
    use hw_if::eqpt::ManualClock;

    struct Rig {
        clock: ManualClock,
        par: FakeEncoder,
        perp: FakeEncoder,
        imu: FakeHeading,
        odom: TwoWheelOdom,
    }

    fn rig() -> Rig {
        let clock = ManualClock::new(0.0);
        let par = FakeEncoder::default();
        let perp = FakeEncoder::default();
        let imu = FakeHeading::default();

        let mut ports = PortRegistry::new();
        ports.add_encoder("par", Box::new(par.clone()));
        ports.add_encoder("perp", Box::new(perp.clone()));
        ports.add_heading("imu", Box::new(imu.clone()));

        let params = TwoWheelParams {
            par: EncoderCfg { port: "par".into(), reversed: false },
            perp: EncoderCfg { port: "perp".into(), reversed: false },
            heading: "imu".into(),
            par_y_ticks: 1.0,
            perp_x_ticks: -2.5,
            in_per_tick: 0.00199,
        };

        let odom = TwoWheelOdom::new(&params, &mut ports, Rc::new(clock.clone())).unwrap();

        Rig { clock, par, perp, imu, odom }
    }

    #[test]
    fn test_forward_step() {
        let mut r = rig();

        // First cycle seeds the conditioners
        r.odom.update();

        r.par.set(500, 5000);
        r.clock.advance(0.1);
        r.odom.update();

        let pose = r.odom.pose();
        assert!((pose.x - 0.995).abs() < 1e-3);
        assert!(pose.y.abs() < 1e-3);
        assert!(pose.heading.abs() < 1e-3);
        assert!(r.odom.velocity().vx > 0.0);
    }

    #[test]
    fn test_invalid_heading_keeps_travel() {
        let mut r = rig();
        r.odom.update();

        // Heading drops out for the cycle the robot moves
        r.imu.set(std::f64::NAN, 0.0);
        r.par.set(500, 5000);
        r.clock.advance(0.1);
        r.odom.update();
        assert_eq!(r.odom.pose(), Pose2D::identity());

        r.imu.set(0.0, 0.0);
        r.clock.advance(0.1);
        r.odom.update();

        let pose = r.odom.pose();
        assert!((pose.x - 0.995).abs() < 1e-3);
        assert!(pose.y.abs() < 1e-3);
        assert!(pose.heading.abs() < 1e-3);
    }

    #[test]
    fn test_zero_input() {
        let mut r = rig();
        r.par.set(1200, 0);
        r.perp.set(-300, 0);
        r.imu.set(0.4, 0.0);

        r.odom.update();
        r.odom.set_pose(Pose2D::new(3.0, 4.0, 0.4));
        let before = r.odom.pose();

        for _ in 0..10 {
            r.clock.advance(0.02);
            r.odom.update();
        }

        assert_eq!(r.odom.pose(), before);
        assert_eq!(r.odom.total_heading(), 0.0);
    }

    #[test]
    fn test_rotation_lever_arm() {
        let mut r = rig();
        r.odom.update();

        // Pure rotation, wheels only see their lever arm contribution
        let dtheta = 0.2;
        r.par.set((1.0 * dtheta) as i32, 0);
        r.perp.set(0, 0);
        r.imu.set(dtheta, 0.0);
        r.clock.advance(0.02);
        r.odom.update();

        assert!((r.odom.total_heading() - dtheta).abs() < 1e-12);
        assert!(r.odom.pose().x.abs() < 1e-2);
    }

    #[test]
    fn test_heading_wrap() {
        let mut r = rig();
        r.imu.set(TAU - 0.05, 0.0);
        r.odom.update();

        r.imu.set(0.05, 0.0);
        r.clock.advance(0.02);
        r.odom.update();

        assert!((r.odom.total_heading() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_rate_rollover() {
        let mut r = rig();
        r.imu.set(0.0, 3.0);
        r.odom.update();

        // Rate wraps from just below +pi to just above -pi
        r.imu.set(0.0, 3.3 - TAU);
        r.clock.advance(0.02);
        r.odom.update();

        assert!((r.odom.velocity_robot().omega - 3.3).abs() < 1e-9);
    }
}
