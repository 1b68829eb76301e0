//! Odometry from an external absolute position module

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use hw_if::{
    eqpt::{Clock, ModuleReading, PoseModulePort},
    registry::PortRegistry,
};

use super::{delegate::ModuleTracker, AbsModuleParams, OdomError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Odometry source which copies the pose reported by an external module.
pub struct AbsModuleOdom {
    port: Box<dyn PoseModulePort>,
    tracker: ModuleTracker,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AbsModuleOdom {
    pub fn new(
        params: &AbsModuleParams,
        ports: &mut PortRegistry,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, OdomError> {
        Ok(Self {
            port: ports.take_module(&params.port)?,
            tracker: ModuleTracker::new(clock),
        })
    }

    fn reading(&mut self) -> ModuleReading {
        self.port.read()
    }
}

delegate_source!(AbsModuleOdom);

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
