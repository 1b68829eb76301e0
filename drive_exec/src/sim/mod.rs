//! # Simulation plant
//!
//! A kinematic model of the robot used to develop and test the drive software without hardware.
//! The plant integrates the wheel powers written to its actuator ports into a true pose, and
//! exposes encoder, heading, pose module and voltage ports which report that pose as the real
//! sensors would.
//!
//! Wheel velocities are modelled as `power * supply_voltage / kv`, so with the same `kv` in the
//! drive feedforward the plant follows the commanded velocity exactly.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod fake;
pub mod traj;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use log::{debug, trace, warn};
use serde::Deserialize;

use hw_if::{
    eqpt::{
        ActuatorPort, EncoderPort, EncoderReading, HeadingPort, HeadingReading, ModuleReading,
        OpticalPort, PoseModulePort, VoltagePort,
    },
    registry::PortRegistry,
};
use util::maths::wrap_2pi;

use crate::{
    loco_ctrl::{Chassis, WheelVels},
    pose::{Pose2D, Twist2D},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Motor velocity constant.
    ///
    /// Units: volts/(inches/second)
    pub kv: f64,

    /// Units: volts
    pub supply_voltage: f64,

    /// Conversion used by every simulated encoder.
    ///
    /// Units: inches/tick
    pub in_per_tick: f64,

    /// Units: [inches, inches, radians]
    #[serde(default)]
    pub start_pose: [f64; 3],

    #[serde(default)]
    pub dead_wheels: Vec<DeadWheelCfg>,

    pub heading_port: Option<String>,

    pub module_port: Option<String>,

    pub optical_port: Option<String>,
}

/// A simulated dead wheel.
#[derive(Debug, Clone, Deserialize)]
pub struct DeadWheelCfg {
    pub port: String,

    /// Robot axis the wheel rolls along.
    pub axis: Axis,

    /// Ticks registered per radian of anticlockwise rotation.
    ///
    /// Units: ticks/radian
    pub lever_ticks: f64,
}

/// The simulated robot.
///
/// Cloning gives another handle on the same plant.
#[derive(Clone)]
pub struct SimPlant {
    state: Rc<RefCell<SimState>>,
}

struct SimState {
    params: SimParams,
    chassis: Chassis,

    pose: Pose2D,

    /// Frame: robot
    vel: Twist2D,

    /// Power last written to each wheel group.
    powers: WheelVels,

    /// Units: ticks
    wheel_ticks: Vec<f64>,
    /// Units: ticks/second
    wheel_rates: Vec<f64>,

    /// Units: ticks
    dead_ticks: Vec<f64>,
    /// Units: ticks/second
    dead_rates: Vec<f64>,

    voltage: f64,

    module_nan: bool,
}

/// Which encoder a port reads.
#[derive(Debug, Copy, Clone)]
enum EncSource {
    Wheel(usize),
    Dead(usize),
}

struct SimEncoder {
    state: Rc<RefCell<SimState>>,
    source: EncSource,
}

struct SimMotor {
    state: Rc<RefCell<SimState>>,
    group: usize,
}

/// Heading sensor, pose module, optical sensor and battery all read the plant directly.
struct SimSensor {
    state: Rc<RefCell<SimState>>,
    linear_scale: f64,
    angular_scale: f64,
    offset: [f64; 3],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimPlant {
    pub fn new(params: SimParams, chassis: Chassis) -> Self {
        let n_wheels = chassis.num_wheels();
        let n_dead = params.dead_wheels.len();

        let state = SimState {
            pose: Pose2D::new(params.start_pose[0], params.start_pose[1], params.start_pose[2]),
            vel: Twist2D::zero(),
            powers: chassis.zeros(),
            wheel_ticks: vec![0.0; n_wheels],
            wheel_rates: vec![0.0; n_wheels],
            dead_ticks: vec![0.0; n_dead],
            dead_rates: vec![0.0; n_dead],
            voltage: params.supply_voltage,
            module_nan: false,
            chassis,
            params,
        };

        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Register the plant's ports.
    ///
    /// Each motor in `wheel_ports` gets an actuator port and an encoder port of the same name.
    pub fn register_ports(
        &self,
        wheel_ports: &[Vec<String>],
        voltage_port: &str,
        ports: &mut PortRegistry,
    ) {
        let st = self.state.borrow();

        if wheel_ports.len() != st.chassis.num_wheels() {
            warn!(
                "Simulating {} wheel groups for a chassis with {} wheels",
                wheel_ports.len(),
                st.chassis.num_wheels()
            );
        }

        for (group, names) in wheel_ports.iter().enumerate().take(st.chassis.num_wheels()) {
            for name in names.iter() {
                ports.add_actuator(name.as_str(), Box::new(SimMotor {
                    state: self.state.clone(),
                    group,
                }));
                ports.add_encoder(name.as_str(), Box::new(SimEncoder {
                    state: self.state.clone(),
                    source: EncSource::Wheel(group),
                }));
            }
        }

        for (i, dw) in st.params.dead_wheels.iter().enumerate() {
            ports.add_encoder(dw.port.as_str(), Box::new(SimEncoder {
                state: self.state.clone(),
                source: EncSource::Dead(i),
            }));
        }

        if let Some(ref name) = st.params.heading_port {
            ports.add_heading(name.as_str(), Box::new(self.sensor()));
        }
        if let Some(ref name) = st.params.module_port {
            ports.add_module(name.as_str(), Box::new(self.sensor()));
        }
        if let Some(ref name) = st.params.optical_port {
            ports.add_optical(name.as_str(), Box::new(self.sensor()));
        }

        ports.add_voltage(voltage_port, Box::new(self.sensor()));

        debug!("Simulated ports registered");
    }

    /// Advance the plant by `dt` seconds using the last written wheel powers.
    pub fn step(&self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        let mut st = self.state.borrow_mut();

        let k = st.voltage / st.params.kv;
        let wheel_vels = st.powers.map(|p| p * k);

        let vel = match st.chassis.forward(&wheel_vels) {
            Ok(v) => v,
            Err(e) => {
                warn!("Simulated kinematics failed: {}", e);
                Twist2D::zero()
            }
        };

        let in_per_tick = st.params.in_per_tick;

        for (i, v) in wheel_vels.values().iter().enumerate() {
            st.wheel_rates[i] = v / in_per_tick;
            st.wheel_ticks[i] += v * dt / in_per_tick;
        }

        for i in 0..st.params.dead_wheels.len() {
            let (axis, lever) = (st.params.dead_wheels[i].axis, st.params.dead_wheels[i].lever_ticks);
            let along = match axis {
                Axis::X => vel.vx,
                Axis::Y => vel.vy,
            };
            let rate = along / in_per_tick + lever * vel.omega;

            st.dead_rates[i] = rate;
            st.dead_ticks[i] += rate * dt;
        }

        st.pose = st.pose.integrate(&vel.scale(dt));
        st.vel = vel;

        trace!("SimPlant pose: {:?}, velocity: {:?}", st.pose, st.vel);
    }

    /// The true pose of the robot.
    pub fn pose(&self) -> Pose2D {
        self.state.borrow().pose
    }

    /// The true velocity, robot frame.
    pub fn velocity(&self) -> Twist2D {
        self.state.borrow().vel
    }

    pub fn powers(&self) -> WheelVels {
        self.state.borrow().powers
    }

    pub fn set_voltage(&self, volts: f64) {
        self.state.borrow_mut().voltage = volts;
    }

    /// Make the pose module and optical sensor report NaN.
    pub fn set_module_nan(&self, nan: bool) {
        self.state.borrow_mut().module_nan = nan;
    }

    fn sensor(&self) -> SimSensor {
        SimSensor {
            state: self.state.clone(),
            linear_scale: 1.0,
            angular_scale: 1.0,
            offset: [0.0; 3],
        }
    }
}

impl EncoderPort for SimEncoder {
    fn read(&mut self) -> EncoderReading {
        let st = self.state.borrow();

        let (ticks, rate) = match self.source {
            EncSource::Wheel(i) => (st.wheel_ticks[i], st.wheel_rates[i]),
            EncSource::Dead(i) => (st.dead_ticks[i], st.dead_rates[i]),
        };

        EncoderReading {
            position: ticks.round() as i32,
            // The hardware only keeps the low 16 bits of the velocity
            velocity: (rate.round() as i32) as i16 as i32,
        }
    }
}

impl ActuatorPort for SimMotor {
    fn set_power(&mut self, power: f64) {
        let mut st = self.state.borrow_mut();
        if let Some(p) = st.powers.values_mut().get_mut(self.group) {
            *p = power;
        }
    }
}

impl HeadingPort for SimSensor {
    fn read(&mut self) -> HeadingReading {
        let st = self.state.borrow();

        HeadingReading {
            heading: wrap_2pi(st.pose.heading),
            heading_rate: st.vel.omega,
        }
    }
}

impl PoseModulePort for SimSensor {
    fn read(&mut self) -> ModuleReading {
        let st = self.state.borrow();

        if st.module_nan {
            return ModuleReading {
                pose: [std::f64::NAN; 3],
                velocity: [std::f64::NAN; 3],
                acceleration: [0.0; 3],
            };
        }

        let vel = st.vel.rotate(st.pose.heading);

        ModuleReading {
            pose: [st.pose.x, st.pose.y, st.pose.heading],
            velocity: [vel.vx, vel.vy, vel.omega],
            acceleration: [0.0; 3],
        }
    }
}

impl OpticalPort for SimSensor {
    fn linear_scale(&self) -> f64 {
        self.linear_scale
    }

    fn set_linear_scale(&mut self, scale: f64) {
        self.linear_scale = scale;
    }

    fn angular_scale(&self) -> f64 {
        self.angular_scale
    }

    fn set_angular_scale(&mut self, scale: f64) {
        self.angular_scale = scale;
    }

    fn offset(&self) -> [f64; 3] {
        self.offset
    }

    fn set_offset(&mut self, offset: [f64; 3]) {
        self.offset = offset;
    }
}

impl VoltagePort for SimSensor {
    fn voltage(&mut self) -> f64 {
        self.state.borrow().voltage
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
