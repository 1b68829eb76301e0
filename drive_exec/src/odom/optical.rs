//! Odometry from an optical correlation sensor

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use log::{info, warn};

use hw_if::{
    eqpt::{Clock, ModuleReading, OpticalPort},
    registry::PortRegistry,
};

use super::{delegate::ModuleTracker, OdomError, OpticalParams};
use crate::pose::Pose2D;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Smallest scale factor accepted by the sensor.
pub const OPTICAL_SCALE_MIN: f64 = 0.872;

/// Largest scale factor accepted by the sensor.
pub const OPTICAL_SCALE_MAX: f64 = 1.127;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Odometry source backed by an optical correlation sensor.
///
/// Behaves like [`super::AbsModuleOdom`] but also gives access to the sensor's calibration, so
/// that it can be tuned at run time.
pub struct OpticalOdom {
    port: Box<dyn OpticalPort>,
    tracker: ModuleTracker,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OpticalOdom {
    pub fn new(
        params: &OpticalParams,
        ports: &mut PortRegistry,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, OdomError> {
        let mut odom = Self {
            port: ports.take_optical(&params.port)?,
            tracker: ModuleTracker::new(clock),
        };

        if let Some(s) = params.linear_scale {
            if !odom.set_linear_scale(s) {
                return Err(OdomError::InvalidParams(format!("linear_scale {} out of range", s)));
            }
        }
        if let Some(s) = params.angular_scale {
            if !odom.set_angular_scale(s) {
                return Err(OdomError::InvalidParams(format!("angular_scale {} out of range", s)));
            }
        }
        if let Some(o) = params.mounting_offset {
            odom.set_mounting_offset(Pose2D::from_array(o));
        }

        Ok(odom)
    }

    pub fn linear_scale(&self) -> f64 {
        self.port.linear_scale()
    }

    /// Set the linear scale, returning false if it was outside of the range the sensor accepts.
    pub fn set_linear_scale(&mut self, scale: f64) -> bool {
        if !scale_in_range(scale) {
            warn!("Rejected optical linear scale {}", scale);
            return false;
        }

        info!("Optical linear scale set to {}", scale);
        self.port.set_linear_scale(scale);
        true
    }

    pub fn angular_scale(&self) -> f64 {
        self.port.angular_scale()
    }

    /// Set the angular scale, returning false if it was outside of the range the sensor accepts.
    pub fn set_angular_scale(&mut self, scale: f64) -> bool {
        if !scale_in_range(scale) {
            warn!("Rejected optical angular scale {}", scale);
            return false;
        }

        info!("Optical angular scale set to {}", scale);
        self.port.set_angular_scale(scale);
        true
    }

    /// Position and heading of the sensor on the robot.
    pub fn mounting_offset(&self) -> Pose2D {
        Pose2D::from_array(self.port.offset())
    }

    pub fn set_mounting_offset(&mut self, offset: Pose2D) {
        info!("Optical mounting offset set to {:?}", offset);
        self.port.set_offset([offset.x, offset.y, offset.heading]);
    }

    fn reading(&mut self) -> ModuleReading {
        self.port.read()
    }
}

delegate_source!(OpticalOdom, {
    fn as_optical_mut(&mut self) -> Option<&mut OpticalOdom> {
        Some(self)
    }
});

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn scale_in_range(scale: f64) -> bool {
    (OPTICAL_SCALE_MIN..=OPTICAL_SCALE_MAX).contains(&scale)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        odom::{build, OdomParams, OdomSource},
        sim::fake::FakeOptical,
    };
    use hw_if::eqpt::ManualClock;

    #[test]
    fn test_calibration_accessors() {
        let sensor = FakeOptical::default();
        let mut ports = PortRegistry::new();
        ports.add_optical("otos", Box::new(sensor.clone()));

        let params = OdomParams::Optical(OpticalParams {
            port: "otos".into(),
            linear_scale: Some(1.05),
            angular_scale: None,
            mounting_offset: Some([1.0, -2.0, 0.0]),
        });

        let mut source = build(&params, &mut ports, Rc::new(ManualClock::new(0.0))).unwrap();
        let optical = source.as_optical_mut().unwrap();

        assert_eq!(optical.linear_scale(), 1.05);
        assert_eq!(optical.angular_scale(), 1.0);
        assert_eq!(optical.mounting_offset().y, -2.0);

        assert!(!optical.set_angular_scale(1.3));
        assert_eq!(optical.angular_scale(), 1.0);
        assert!(optical.set_angular_scale(0.99));
        assert_eq!(sensor.angular_scale(), 0.99);
    }

    #[test]
    fn test_out_of_range_param() {
        let mut ports = PortRegistry::new();
        ports.add_optical("otos", Box::new(FakeOptical::default()));

        let params = OpticalParams {
            port: "otos".into(),
            linear_scale: Some(0.5),
            angular_scale: None,
            mounting_offset: None,
        };

        let res = OpticalOdom::new(&params, &mut ports, Rc::new(ManualClock::new(0.0)));
        assert!(matches!(res, Err(OdomError::InvalidParams(_))));
    }
}
