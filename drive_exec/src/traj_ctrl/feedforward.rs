//! # Motor feedforward
//!
//! Predicts the voltage a wheel needs for a given velocity and acceleration, then turns it into a
//! power by dividing by the measured supply voltage. As the battery sags the same motion needs
//! more power.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::params::FeedforwardCoeffs;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Linear motor model `V = ks·sign(v) + kv·v + ka·a`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotorFeedforward {
    coeffs: FeedforwardCoeffs,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotorFeedforward {
    pub fn new(coeffs: FeedforwardCoeffs) -> Self {
        Self { coeffs }
    }

    /// Voltage required for a wheel velocity and acceleration.
    ///
    /// Units: volts
    pub fn voltage(&self, vel: f64, accel: f64) -> f64 {
        // No static friction term when stationary
        let sign = if vel == 0.0 { 0.0 } else { vel.signum() };

        self.coeffs.ks * sign + self.coeffs.kv * vel + self.coeffs.ka * accel
    }

    /// Power in [-1, 1] required at the given supply voltage.
    ///
    /// Returns `None` if the supply voltage is not a finite positive value.
    pub fn power(&self, vel: f64, accel: f64, supply_voltage: f64) -> Option<f64> {
        if !(supply_voltage.is_finite() && supply_voltage > 0.0) {
            return None;
        }

        let power = self.voltage(vel, accel) / supply_voltage;

        if power.is_nan() {
            return None;
        }

        Some(clamp(&power, &-1.0, &1.0))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn ff() -> MotorFeedforward {
        MotorFeedforward::new(FeedforwardCoeffs {
            ks: 0.5,
            kv: 0.1,
            ka: 0.02,
        })
    }

    #[test]
    fn test_voltage_compensation() {
        let ff = ff();

        let full = ff.power(30.0, 10.0, 12.5).unwrap();
        let sagged = ff.power(30.0, 10.0, 10.0).unwrap();

        assert!((full - 3.7 / 12.5).abs() < 1e-12);
        assert!(sagged > full);
        assert!((sagged - 0.37).abs() < 1e-12);
    }

    #[test]
    fn test_static_friction_sign() {
        let ff = ff();

        assert_eq!(ff.voltage(0.0, 0.0), 0.0);
        assert!((ff.voltage(-10.0, 0.0) + 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_and_invalid_supply() {
        let ff = ff();

        assert_eq!(ff.power(1000.0, 0.0, 12.0), Some(1.0));
        assert_eq!(ff.power(-1000.0, 0.0, 12.0), Some(-1.0));
        assert_eq!(ff.power(10.0, 0.0, 0.0), None);
        assert_eq!(ff.power(10.0, 0.0, -12.0), None);
        assert_eq!(ff.power(10.0, 0.0, std::f64::NAN), None);
    }
}
