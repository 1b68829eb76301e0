//! # Fake ports
//!
//! Ports whose readings are set directly by a test. Every fake is a cheap handle, clones share
//! the same underlying value so a test can keep one clone while the other is boxed into the
//! registry.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use hw_if::eqpt::{
    ActuatorPort, EncoderPort, EncoderReading, HeadingPort, HeadingReading, ModuleReading,
    OpticalPort, PoseModulePort, VoltagePort,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FakeEncoder {
    reading: Rc<Cell<EncoderReading>>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeHeading {
    reading: Rc<Cell<HeadingReading>>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeModule {
    reading: Rc<Cell<ModuleReading>>,
}

/// Fake optical sensor. Scales default to 1.
#[derive(Debug, Clone)]
pub struct FakeOptical {
    state: Rc<RefCell<OpticalState>>,
}

#[derive(Debug)]
struct OpticalState {
    reading: ModuleReading,
    linear_scale: f64,
    angular_scale: f64,
    offset: [f64; 3],
}

/// Records the last power written to it.
#[derive(Debug, Clone, Default)]
pub struct FakeMotor {
    power: Rc<Cell<f64>>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeVoltage {
    volts: Rc<Cell<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FakeEncoder {
    /// Units: ticks, ticks/second
    pub fn set(&self, position: i32, velocity: i32) {
        self.reading.set(EncoderReading { position, velocity });
    }
}

impl EncoderPort for FakeEncoder {
    fn read(&mut self) -> EncoderReading {
        self.reading.get()
    }
}

impl FakeHeading {
    /// Units: radians, radians/second
    pub fn set(&self, heading: f64, heading_rate: f64) {
        self.reading.set(HeadingReading { heading, heading_rate });
    }
}

impl HeadingPort for FakeHeading {
    fn read(&mut self) -> HeadingReading {
        self.reading.get()
    }
}

impl FakeModule {
    /// Set the reported pose `[x, y, heading]` and velocity.
    pub fn set_pose(&self, pose: [f64; 3], velocity: [f64; 3]) {
        self.reading.set(ModuleReading {
            pose,
            velocity,
            acceleration: [0.0; 3],
        });
    }
}

impl PoseModulePort for FakeModule {
    fn read(&mut self) -> ModuleReading {
        self.reading.get()
    }
}

impl Default for FakeOptical {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(OpticalState {
                reading: ModuleReading::default(),
                linear_scale: 1.0,
                angular_scale: 1.0,
                offset: [0.0; 3],
            })),
        }
    }
}

impl FakeOptical {
    pub fn set_pose(&self, pose: [f64; 3], velocity: [f64; 3]) {
        self.state.borrow_mut().reading = ModuleReading {
            pose,
            velocity,
            acceleration: [0.0; 3],
        };
    }

    pub fn linear_scale(&self) -> f64 {
        self.state.borrow().linear_scale
    }

    pub fn angular_scale(&self) -> f64 {
        self.state.borrow().angular_scale
    }

    pub fn offset(&self) -> [f64; 3] {
        self.state.borrow().offset
    }
}

impl PoseModulePort for FakeOptical {
    fn read(&mut self) -> ModuleReading {
        self.state.borrow().reading
    }
}

impl OpticalPort for FakeOptical {
    fn linear_scale(&self) -> f64 {
        FakeOptical::linear_scale(self)
    }

    fn set_linear_scale(&mut self, scale: f64) {
        self.state.borrow_mut().linear_scale = scale;
    }

    fn angular_scale(&self) -> f64 {
        FakeOptical::angular_scale(self)
    }

    fn set_angular_scale(&mut self, scale: f64) {
        self.state.borrow_mut().angular_scale = scale;
    }

    fn offset(&self) -> [f64; 3] {
        FakeOptical::offset(self)
    }

    fn set_offset(&mut self, offset: [f64; 3]) {
        self.state.borrow_mut().offset = offset;
    }
}

impl FakeMotor {
    pub fn power(&self) -> f64 {
        self.power.get()
    }
}

impl ActuatorPort for FakeMotor {
    fn set_power(&mut self, power: f64) {
        self.power.set(power);
    }
}

impl FakeVoltage {
    pub fn new(volts: f64) -> Self {
        Self {
            volts: Rc::new(Cell::new(volts)),
        }
    }

    pub fn set(&self, volts: f64) {
        self.volts.set(volts);
    }
}

impl VoltagePort for FakeVoltage {
    fn voltage(&mut self) -> f64 {
        self.volts.get()
    }
}
