//! # Hardware interface crate.
//!
//! Provides the typed ports through which the drive software reads its sensors and commands its
//! actuators. Concrete drivers (or the simulation plant) implement these traits, register
//! themselves in a [`registry::PortRegistry`] at start up, and are resolved by name exactly once
//! when each component is configured.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Sensor and actuator port definitions
pub mod eqpt;

/// Named port registry used during configuration
pub mod registry;

/// Manual drive commands
pub mod tc;
