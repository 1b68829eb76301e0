//! Implementations for the LocoCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{Chassis, FieldCentricRef, LocoCmd, LocoCtrlError, Params, WheelPowers};
use crate::pose::Twist2D;
use util::{maths::clamp, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locomotion control module state
#[derive(Default)]
pub struct LocoCtrl {
    chassis: Option<Chassis>,

    speed_multiplier: f64,

    field_centric: bool,
    field_centric_ref: FieldCentricRef,

    /// Heading captured when field centric driving was enabled.
    ///
    /// Units: radians
    initial_heading: Option<f64>,

    pub(crate) report: StatusReport,

    pub(crate) current_cmd: Option<LocoCmd>,
}

/// Input data to Locomotion Control.
#[derive(Default)]
pub struct InputData {
    /// The drive command to be executed, or `None` if there is no new command on this cycle, in
    /// which case the previous command continues.
    pub cmd: Option<LocoCmd>,
}

/// Status report for LocoCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the mixed powers exceeded 1 and had to be scaled down.
    pub saturated: bool,

    /// Largest wheel power magnitude before normalisation.
    pub max_mixed_power: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {
    /// Create a new initialised LocoCtrl.
    pub fn new(params: Params) -> Result<Self, LocoCtrlError> {
        let mut lc = Self::default();
        lc.init(params)?;
        Ok(lc)
    }

    pub fn chassis(&self) -> Option<&Chassis> {
        self.chassis.as_ref()
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Set the multiplier applied to manual powers, clamped to [0, 1].
    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        self.speed_multiplier = if multiplier.is_finite() {
            clamp(&multiplier, &0.0, &1.0)
        }
        else {
            0.0
        };
    }

    /// Enable or disable field centric driving.
    ///
    /// `heading` is the robot's current heading, captured as the reference when the reference
    /// is `FieldCentricRef::Initial`.
    pub fn set_field_centric(&mut self, enabled: bool, heading: f64) {
        self.field_centric = enabled;
        self.initial_heading = if enabled { Some(heading) } else { None };

        debug!("Field centric driving {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn set_field_centric_ref(&mut self, reference: FieldCentricRef) {
        self.field_centric_ref = reference;
    }

    pub fn report(&self) -> StatusReport {
        self.report
    }

    /// Mix a manual drive request into wheel powers.
    ///
    /// The powers are normalised by the largest magnitude if it exceeds 1, keeping their ratios,
    /// then scaled by the speed multiplier. Non-finite inputs stop the wheels. Returns `None` if
    /// LocoCtrl isn't initialised.
    pub fn drive(&mut self, x: f64, y: f64, turn: f64, heading: f64) -> Option<WheelPowers> {
        let chassis = self.chassis?;

        if !(x.is_finite() && y.is_finite() && turn.is_finite() && heading.is_finite()) {
            warn!(
                "Invalid manual drive request (x: {}, y: {}, turn: {}, heading: {}), stopping",
                x, y, turn, heading
            );
            self.report = StatusReport::default();
            return Some(chassis.zeros());
        }

        // Without a captured reference the first driven heading becomes the initial heading
        if self.field_centric && self.initial_heading.is_none() {
            self.initial_heading = Some(heading);
        }

        let (x, y) = if self.field_centric && chassis.is_holonomic() {
            let reference = match self.field_centric_ref {
                FieldCentricRef::Current => heading,
                FieldCentricRef::Initial => heading - self.initial_heading.unwrap_or(heading),
            };

            let robot = Twist2D::new(x, y, 0.0).rotate(-reference);
            (robot.vx, robot.vy)
        }
        else {
            (x, y)
        };

        let mixed = chassis.mix(x, y, turn);
        let max = mixed.max_abs();

        self.report.max_mixed_power = max;
        self.report.saturated = max > 1.0;

        let norm = if max > 1.0 { max } else { 1.0 };
        let multiplier = self.speed_multiplier;
        let powers = mixed.map(|p| p / norm * multiplier);

        trace!("LocoCtrl manual powers: {:?}", powers);

        Some(powers)
    }
}

impl State for LocoCtrl {
    type InitData = Params;
    type InitError = LocoCtrlError;

    type InputData = InputData;
    type OutputData = WheelPowers;
    type StatusReport = StatusReport;
    type ProcError = LocoCtrlError;

    /// Initialise the LocoCtrl module from its parameters.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.chassis = Some(Chassis::from_params(&init_data.chassis)?);
        self.set_speed_multiplier(init_data.speed_multiplier);
        self.field_centric_ref = init_data.field_centric_ref;
        self.field_centric = init_data.field_centric;
        self.initial_heading = None;
        self.current_cmd = None;

        Ok(())
    }

    /// Perform cyclic processing of Locomotion Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        let chassis = self.chassis.ok_or(LocoCtrlError::NotInit)?;

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            if !cmd.is_valid() {
                return Err(LocoCtrlError::InvalidCmd(cmd));
            }
            self.current_cmd = Some(cmd);
        }

        let output = match self.current_cmd {
            Some(LocoCmd::Manual { x, y, turn, heading }) => {
                self.drive(x, y, turn, heading).unwrap_or_else(|| chassis.zeros())
            }
            Some(LocoCmd::Stop) | None => chassis.zeros(),
        };

        Ok((output, self.report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::loco_ctrl::{ChassisParams, MecanumParams, TankParams, WheelVels};
    use std::f64::consts::FRAC_PI_2;

    fn mecanum_params() -> Params {
        Params {
            chassis: ChassisParams::Mecanum(MecanumParams {
                track_width: 14.0,
                wheelbase: 12.0,
                lateral_multiplier: 1.0,
            }),
            speed_multiplier: 1.0,
            field_centric: false,
            field_centric_ref: FieldCentricRef::Current,
        }
    }

    fn assert_powers_close(a: &WheelPowers, b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.values().iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-12, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_normalisation_keeps_ratios() {
        let mut lc = LocoCtrl::new(mecanum_params()).unwrap();

        // lf = 1 - 0.5 - 0.5 = 0, lb = 1, rb = 1, rf = 2
        let p = lc.drive(1.0, 0.5, 0.5, 0.0).unwrap();
        assert_powers_close(&p, &[0.0, 0.5, 0.5, 1.0]);
        assert!(lc.report().saturated);

        // Within range, passed through unchanged
        let p = lc.drive(0.5, 0.0, 0.0, 0.0).unwrap();
        assert_powers_close(&p, &[0.5; 4]);
        assert!(!lc.report().saturated);
    }

    #[test]
    fn test_speed_multiplier() {
        let mut lc = LocoCtrl::new(mecanum_params()).unwrap();

        lc.set_speed_multiplier(0.5);
        let p = lc.drive(2.0, 0.0, 0.0, 0.0).unwrap();
        assert_powers_close(&p, &[0.5; 4]);

        lc.set_speed_multiplier(3.0);
        assert_eq!(lc.speed_multiplier(), 1.0);
        lc.set_speed_multiplier(-1.0);
        assert_eq!(lc.speed_multiplier(), 0.0);
    }

    #[test]
    fn test_field_centric() {
        let mut lc = LocoCtrl::new(mecanum_params()).unwrap();
        lc.set_field_centric(true, 0.0);

        // Facing +Y, a field +X request is a robot rightwards strafe
        let p = lc.drive(0.5, 0.0, 0.0, FRAC_PI_2).unwrap();
        assert_powers_close(&p, &[0.5, -0.5, 0.5, -0.5]);

        // Relative to the initial heading, the same request is a forwards drive
        lc.set_field_centric_ref(FieldCentricRef::Initial);
        lc.set_field_centric(true, FRAC_PI_2);
        let p = lc.drive(0.5, 0.0, 0.0, FRAC_PI_2).unwrap();
        assert_powers_close(&p, &[0.5; 4]);
    }

    #[test]
    fn test_initial_heading_from_params() {
        let mut params = mecanum_params();
        params.field_centric = true;
        params.field_centric_ref = FieldCentricRef::Initial;
        let mut lc = LocoCtrl::new(params).unwrap();

        // First drive captures the reference
        let p = lc.drive(0.5, 0.0, 0.0, 0.0).unwrap();
        assert_powers_close(&p, &[0.5; 4]);

        // Turned a quarter anticlockwise, field +X is now a rightwards strafe
        let p = lc.drive(0.5, 0.0, 0.0, FRAC_PI_2).unwrap();
        assert_powers_close(&p, &[0.5, -0.5, 0.5, -0.5]);
    }

    #[test]
    fn test_non_finite_request() {
        let mut lc = LocoCtrl::new(mecanum_params()).unwrap();

        for (x, y, turn, heading) in [
            (std::f64::NAN, 0.0, 0.0, 0.0),
            (0.0, std::f64::INFINITY, 0.0, 0.0),
            (0.0, 0.0, std::f64::NEG_INFINITY, 0.0),
            (0.5, 0.0, 0.0, std::f64::NAN),
        ].iter() {
            let p = lc.drive(*x, *y, *turn, *heading).unwrap();
            assert_powers_close(&p, &[0.0; 4]);
            assert!(!lc.report().saturated);
        }
    }

    #[test]
    fn test_tank_ignores_strafe() {
        let mut params = mecanum_params();
        params.chassis = ChassisParams::Tank(TankParams { track_width: 15.0 });
        params.field_centric = true;
        let mut lc = LocoCtrl::new(params).unwrap();

        let p = lc.drive(0.5, 1.0, 0.25, 1.0).unwrap();
        assert_eq!(p, WheelVels::Tank([0.25, 0.75]));
    }

    #[test]
    fn test_proc() {
        let mut lc = LocoCtrl::default();
        assert!(matches!(
            lc.proc(&InputData::default()),
            Err(LocoCtrlError::NotInit)
        ));

        lc.init(mecanum_params()).unwrap();

        let cmd = LocoCmd::Manual { x: 0.5, y: 0.0, turn: 0.0, heading: 0.0 };
        let (out, _) = lc.proc(&InputData { cmd: Some(cmd) }).unwrap();
        assert_powers_close(&out, &[0.5; 4]);

        // No new command, keep driving
        let (out, _) = lc.proc(&InputData::default()).unwrap();
        assert_powers_close(&out, &[0.5; 4]);

        let (out, _) = lc.proc(&InputData { cmd: Some(LocoCmd::Stop) }).unwrap();
        assert_powers_close(&out, &[0.0; 4]);

        let bad = LocoCmd::Manual { x: std::f64::NAN, y: 0.0, turn: 0.0, heading: 0.0 };
        assert!(lc.proc(&InputData { cmd: Some(bad) }).is_err());
    }
}
