//! # Port registry
//!
//! Drivers register their ports under a name when the robot starts. Component factories then
//! take the ports they are configured to use, so that each port is looked up by name once and
//! then owned by exactly one component.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::eqpt::{ActuatorPort, EncoderPort, HeadingPort, OpticalPort, PoseModulePort, VoltagePort};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Registry of all ports available on the robot.
#[derive(Default)]
pub struct PortRegistry {
    encoders: HashMap<String, Box<dyn EncoderPort>>,
    headings: HashMap<String, Box<dyn HeadingPort>>,
    modules: HashMap<String, Box<dyn PoseModulePort>>,
    opticals: HashMap<String, Box<dyn OpticalPort>>,
    actuators: HashMap<String, Box<dyn ActuatorPort>>,
    voltages: HashMap<String, Box<dyn VoltagePort>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The kind of a port, used in error reporting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PortKind {
    Encoder,
    Heading,
    PoseModule,
    Optical,
    Actuator,
    Voltage,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("No {kind:?} port named {name:?} is registered (or it has already been taken)")]
    NotFound { kind: PortKind, name: String },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

macro_rules! port_accessors {
    ($add:ident, $take:ident, $field:ident, $tr:ident, $kind:expr) => {
        /// Register a port under the given name, replacing any existing port of that name.
        pub fn $add<N: Into<String>>(&mut self, name: N, port: Box<dyn $tr>) {
            let name = name.into();
            debug!("Registered {:?} port {:?}", $kind, name);
            self.$field.insert(name, port);
        }

        /// Take ownership of the named port.
        pub fn $take(&mut self, name: &str) -> Result<Box<dyn $tr>, PortError> {
            self.$field.remove(name).ok_or_else(|| PortError::NotFound {
                kind: $kind,
                name: name.to_string(),
            })
        }
    };
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    port_accessors!(add_encoder, take_encoder, encoders, EncoderPort, PortKind::Encoder);
    port_accessors!(add_heading, take_heading, headings, HeadingPort, PortKind::Heading);
    port_accessors!(add_module, take_module, modules, PoseModulePort, PortKind::PoseModule);
    port_accessors!(add_optical, take_optical, opticals, OpticalPort, PortKind::Optical);
    port_accessors!(add_actuator, take_actuator, actuators, ActuatorPort, PortKind::Actuator);
    port_accessors!(add_voltage, take_voltage, voltages, VoltagePort, PortKind::Voltage);
}
