//! Skid-steer drive encoder odometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use log::trace;

use hw_if::{eqpt::Clock, registry::PortRegistry};

use super::{tracker::{CycleTimer, PoseTracker}, OdomError, TankOdomParams};
use crate::{enc_cond::{EncCond, EncoderCfg}, loco_ctrl::TankKinematics};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Odometry from the drive motor encoders of a skid-steer chassis.
///
/// Each side may have several ganged motors, their encoders are averaged.
pub struct TankOdom {
    in_per_tick: f64,
    kinematics: TankKinematics,

    left: Vec<EncCond>,
    right: Vec<EncCond>,

    timer: CycleTimer,
    tracker: PoseTracker,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TankOdom {
    pub fn new(
        params: &TankOdomParams,
        ports: &mut PortRegistry,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, OdomError> {
        let kinematics = TankKinematics::new(&params.kinematics)
            .map_err(|e| OdomError::InvalidParams(e.to_string()))?;

        if params.left.is_empty() || params.right.is_empty() {
            return Err(OdomError::InvalidParams(
                "each side needs at least one encoder".into(),
            ));
        }

        if !(params.in_per_tick.is_finite() && params.in_per_tick != 0.0) {
            return Err(OdomError::InvalidParams(format!(
                "in_per_tick must be finite and non-zero, found {}",
                params.in_per_tick
            )));
        }

        Ok(Self {
            in_per_tick: params.in_per_tick,
            kinematics,
            left: take_side(&params.left, ports)?,
            right: take_side(&params.right, ports)?,
            timer: CycleTimer::new(clock),
            tracker: PoseTracker::default(),
        })
    }

    fn update_impl(&mut self) {
        let dt = self.timer.dt();

        let (l_delta, l_vel) = average_side(&mut self.left, dt);
        let (r_delta, r_vel) = average_side(&mut self.right, dt);

        let k = self.in_per_tick;
        let incr = self.kinematics.forward(&[l_delta * k, r_delta * k]);
        let vel = self.kinematics.forward(&[l_vel * k, r_vel * k]);

        trace!("TankOdom increment: {:?}, velocity: {:?}", incr, vel);

        self.tracker.apply(&incr, &vel);
    }
}

tracked_source!(TankOdom);

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn take_side(cfgs: &[EncoderCfg], ports: &mut PortRegistry) -> Result<Vec<EncCond>, OdomError> {
    cfgs.iter()
        .map(|c| EncCond::from_cfg(c, ports).map_err(OdomError::from))
        .collect()
}

/// Mean delta (ticks) and velocity (ticks/s) of one side.
fn average_side(side: &mut [EncCond], dt: f64) -> (f64, f64) {
    let n = side.len() as f64;

    let (delta, vel) = side.iter_mut().fold((0.0, 0.0), |(d, v), enc| {
        let s = enc.update(dt);
        (d + s.delta as f64, v + s.velocity)
    });

    (delta / n, vel / n)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
