//! # Actuator and power ports

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A single motor (or wheel) power output.
pub trait ActuatorPort {
    /// Command a normalised power in the range [-1, 1].
    fn set_power(&mut self, power: f64);
}

/// The robot's supply voltage sensor.
pub trait VoltagePort {
    /// The measured supply voltage.
    ///
    /// Units: volts
    fn voltage(&mut self) -> f64;
}
