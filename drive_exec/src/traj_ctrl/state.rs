//! Drive controller state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::rc::Rc;
use log::{error, info, trace, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::{
    loco_ctrl::{self, Chassis, InputData, LocoCmd, LocoCtrl, WheelPowers},
    odom::OdomSource,
    persist::PoseStore,
    pose::{Pose2D, Twist2D},
};
use hw_if::{
    eqpt::{ActuatorPort, Clock, VoltagePort},
    registry::PortRegistry,
    tc::DriveCmd,
};
use util::{module::State, params::LoadError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Key the pose is persisted under unless the parameters give another.
pub const DEFAULT_PERSIST_KEY: &str = "drive_pose";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The drive controller.
///
/// Owns the odometry source and the drive hardware. If the drive could not be configured all
/// commands are ignored, but odometry and pose persistence keep working.
pub struct DriveCtrl {
    hw: Option<DriveHw>,

    odom: Box<dyn OdomSource>,

    clock: Rc<dyn Clock>,

    store: Box<dyn PoseStore>,
    persist_key: String,

    report: StatusReport,

    last_powers: Option<WheelPowers>,
}

/// Everything needed to command the wheels.
struct DriveHw {
    loco: LocoCtrl,
    chassis: Chassis,

    /// One group of motors per wheel in the chassis' order.
    motors: Vec<Vec<Box<dyn ActuatorPort>>>,
    voltage: Box<dyn VoltagePort>,

    holonomic: HolonomicController,
    ramsete: Option<RamseteController>,
    turn: TurnController,
    feedforward: MotorFeedforward,
}

/// The status report containing the tracking errors and commands of the last cycle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Units: inches
    pub err_x: f64,

    /// Units: inches
    pub err_y: f64,

    /// Units: radians
    pub err_heading: f64,

    /// Units: inches/second, Frame: robot
    pub cmd_vx: f64,

    /// Units: inches/second, Frame: robot
    pub cmd_vy: f64,

    /// Units: radians/second
    pub cmd_omega: f64,

    /// Units: volts
    pub supply_voltage: f64,

    /// If true the supply voltage was unusable and the wheels were stopped.
    pub voltage_invalid: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveHw {
    fn build(
        params: &Params,
        loco_params: loco_ctrl::Params,
        ports: &mut PortRegistry,
    ) -> Result<Self, TrajCtrlError> {
        let loco = LocoCtrl::new(loco_params)?;
        let chassis = *loco.chassis().ok_or(loco_ctrl::LocoCtrlError::NotInit)?;

        if params.wheel_ports.len() != chassis.num_wheels() {
            return Err(TrajCtrlError::WrongWheelGroups {
                expected: chassis.num_wheels(),
                found: params.wheel_ports.len(),
            });
        }
        if params.wheel_ports.iter().any(|g| g.is_empty()) {
            return Err(TrajCtrlError::InvalidParams("empty wheel group".into()));
        }

        let mut motors = Vec::with_capacity(params.wheel_ports.len());
        for group in params.wheel_ports.iter() {
            let mut g = Vec::with_capacity(group.len());
            for name in group.iter() {
                g.push(ports.take_actuator(name)?);
            }
            motors.push(g);
        }

        let ramsete = match chassis {
            Chassis::Tank(k) => Some(RamseteController::new(params.ramsete, k.track_width())),
            Chassis::Mecanum(_) => None,
        };

        Ok(Self {
            loco,
            chassis,
            motors,
            voltage: ports.take_voltage(&params.voltage_port)?,
            holonomic: HolonomicController::new(params.holonomic),
            ramsete,
            turn: TurnController::new(params.turn),
            feedforward: MotorFeedforward::new(params.feedforward),
        })
    }

    fn write(&mut self, powers: &WheelPowers) {
        for (group, power) in self.motors.iter_mut().zip(powers.values().iter()) {
            for motor in group.iter_mut() {
                motor.set_power(*power);
            }
        }
    }
}

impl DriveCtrl {
    /// Build the drive controller.
    ///
    /// Parameter or port errors are logged and leave the drive unconfigured rather than failing.
    /// If enabled, the pose saved by a previous run is restored into `odom`.
    pub fn new(
        params: Result<Params, LoadError>,
        loco_params: Result<loco_ctrl::Params, LoadError>,
        odom: Box<dyn OdomSource>,
        ports: &mut PortRegistry,
        clock: Rc<dyn Clock>,
        store: Box<dyn PoseStore>,
    ) -> Self {
        let mut persist_key = String::from(DEFAULT_PERSIST_KEY);
        let mut restore = true;

        let hw = params
            .map_err(TrajCtrlError::ParamLoadError)
            .and_then(|p| {
                persist_key = p.persist_key.clone();
                restore = p.restore_pose;

                let lp = loco_params.map_err(TrajCtrlError::ParamLoadError)?;
                DriveHw::build(&p, lp, ports)
            });

        let hw = match hw {
            Ok(hw) => {
                info!("DriveCtrl configured for a {:?} chassis", hw.chassis);
                Some(hw)
            }
            Err(e) => {
                error!("DriveCtrl is not configured: {}", e);
                None
            }
        };

        let mut dc = Self {
            hw,
            odom,
            clock,
            store,
            persist_key,
            report: StatusReport::default(),
            last_powers: None,
        };

        if restore {
            dc.restore_pose();
        }

        dc
    }

    pub fn is_configured(&self) -> bool {
        self.hw.is_some()
    }

    /// Current clock time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn odom(&self) -> &dyn OdomSource {
        self.odom.as_ref()
    }

    pub fn odom_mut(&mut self) -> &mut dyn OdomSource {
        self.odom.as_mut()
    }

    pub fn report(&self) -> StatusReport {
        self.report
    }

    /// Powers written on the last cycle, if any.
    pub fn last_powers(&self) -> Option<WheelPowers> {
        self.last_powers
    }

    /// Update the odometry, returning the new robot-frame velocity.
    pub fn update_pose_estimate(&mut self) -> Twist2D {
        self.odom.update();
        self.odom.velocity_robot()
    }

    /// Start following a path.
    pub fn follow(&self, traj: Box<dyn Trajectory>) -> FollowAction {
        FollowAction::follow_path(traj)
    }

    /// Start a turn on the spot.
    pub fn turn(&self, traj: Box<dyn Trajectory>) -> FollowAction {
        FollowAction::turn(traj)
    }

    /// Manual driving, see [`LocoCtrl::drive`].
    pub fn drive(&mut self, x: f64, y: f64, turn: f64) {
        let heading = self.odom.pose().heading;

        let powers = match self.hw {
            Some(ref mut hw) => hw.loco.drive(x, y, turn, heading),
            None => return,
        };

        if let Some(p) = powers {
            self.write_powers(&p);
        }
    }

    /// Execute a drive telecommand through LocoCtrl.
    pub fn command(&mut self, cmd: &DriveCmd) {
        let heading = self.odom.pose().heading;

        let out = match self.hw {
            Some(ref mut hw) => hw.loco.proc(&InputData {
                cmd: Some(LocoCmd::from_tc(cmd, heading)),
            }),
            None => return,
        };

        match out {
            Ok((powers, _)) => self.write_powers(&powers),
            Err(e) => {
                warn!("Drive command rejected: {}", e);
                self.stop();
            }
        }
    }

    /// Write zero power to every wheel.
    pub fn stop(&mut self) {
        let zeros = match self.hw {
            Some(ref hw) => hw.chassis.zeros(),
            None => return,
        };

        self.write_powers(&zeros);
    }

    /// Save the current pose to the pose store.
    pub fn save_pose(&mut self) {
        let pose = self.odom.pose();

        match self.store.save(&self.persist_key, pose) {
            Ok(()) => info!("Saved pose {:?} as {:?}", pose, self.persist_key),
            Err(e) => warn!("Could not save the pose: {}", e),
        }
    }

    /// Set the odometry pose from the pose store, if one was saved.
    pub fn restore_pose(&mut self) -> Option<Pose2D> {
        let pose = self.store.load(&self.persist_key)?;

        info!("Restored pose {:?} from {:?}", pose, self.persist_key);
        self.odom.set_pose(pose);

        Some(pose)
    }

    /// Track one sample of a trajectory, writing the resulting wheel powers.
    pub(crate) fn track(&mut self, kind: ActionKind, target: &PoseDual) {
        let pose = self.odom.pose();
        let vel = self.odom.velocity_robot();

        let hw = match self.hw {
            Some(ref mut hw) => hw,
            None => return,
        };

        let (cmd, err) = match (kind, hw.ramsete) {
            (ActionKind::FollowPath, Some(ramsete)) => ramsete.compute(target, &pose),
            (ActionKind::Turn, Some(_)) => hw.turn.compute(target, &pose, &vel),
            (_, None) => hw.holonomic.compute(target, &pose, &vel),
        };

        let wheel_vels = hw.chassis.inverse(&cmd.vel);
        let wheel_accels = hw.chassis.inverse(&cmd.accel);

        let supply_voltage = hw.voltage.voltage();

        let mut report = StatusReport {
            err_x: err.x,
            err_y: err.y,
            err_heading: err.heading,
            cmd_vx: cmd.vel.vx,
            cmd_vy: cmd.vel.vy,
            cmd_omega: cmd.vel.omega,
            supply_voltage,
            voltage_invalid: false,
        };

        let mut powers = hw.chassis.zeros();
        for (i, p) in powers.values_mut().iter_mut().enumerate() {
            match hw.feedforward.power(
                wheel_vels.values()[i],
                wheel_accels.values()[i],
                supply_voltage,
            ) {
                Some(power) => *p = power,
                None => {
                    report.voltage_invalid = true;
                    break;
                }
            }
        }

        if report.voltage_invalid {
            warn!("Invalid supply voltage {}, stopping the wheels", supply_voltage);
            powers = hw.chassis.zeros();
        }

        trace!("DriveCtrl tracking: {:?}", report);

        self.report = report;
        self.write_powers(&powers);
    }

    fn write_powers(&mut self, powers: &WheelPowers) {
        if let Some(ref mut hw) = self.hw {
            hw.write(powers);
            self.last_powers = Some(*powers);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        loco_ctrl::{ChassisParams, FieldCentricRef, MecanumParams, TankParams},
        odom::{AbsModuleParams, OdomParams, UnconfiguredOdom},
        persist::MemPoseStore,
        sim::{
            fake::{FakeModule, FakeMotor, FakeVoltage},
            traj::{LineTrajectory, TurnTrajectory},
        },
    };
    use hw_if::eqpt::ManualClock;

    struct Rig {
        clock: ManualClock,
        motors: Vec<FakeMotor>,
        battery: FakeVoltage,
        drive: DriveCtrl,
    }

    fn drive_params(groups: Vec<Vec<String>>) -> Params {
        util::params::load_str::<Params>(
            r#"
            wheel_ports = []
            voltage_port = "battery"

            [holonomic]
            axial_gain = 1.0
            lateral_gain = 1.0
            heading_gain = 1.0
            axial_vel_gain = 0.0
            lateral_vel_gain = 0.0
            heading_vel_gain = 0.0

            [ramsete]
            zeta = 0.7
            b_bar = 2.0

            [turn]
            turn_gain = 1.0
            turn_vel_gain = 0.0

            [feedforward]
            ks = 0.0
            kv = 0.1
            ka = 0.0
            "#,
        )
        .map(|mut p| {
            p.wheel_ports = groups;
            p
        })
        .unwrap()
    }

    fn rig(chassis: ChassisParams, groups: &[&[&str]]) -> Rig {
        let clock = ManualClock::new(0.0);
        let battery = FakeVoltage::new(12.0);
        let mut ports = PortRegistry::new();
        ports.add_voltage("battery", Box::new(battery.clone()));

        let mut motors = Vec::new();
        for name in groups.iter().flat_map(|g| g.iter()) {
            let m = FakeMotor::default();
            ports.add_actuator(*name, Box::new(m.clone()));
            motors.push(m);
        }

        let groups = groups
            .iter()
            .map(|g| g.iter().map(|s| s.to_string()).collect())
            .collect();

        let loco_params = loco_ctrl::Params {
            chassis,
            speed_multiplier: 1.0,
            field_centric: false,
            field_centric_ref: FieldCentricRef::Current,
        };

        let drive = DriveCtrl::new(
            Ok(drive_params(groups)),
            Ok(loco_params),
            Box::new(UnconfiguredOdom),
            &mut ports,
            Rc::new(clock.clone()),
            Box::new(MemPoseStore::default()),
        );

        Rig { clock, motors, battery, drive }
    }

    fn mecanum_rig() -> Rig {
        rig(
            ChassisParams::Mecanum(MecanumParams {
                track_width: 14.0,
                wheelbase: 12.0,
                lateral_multiplier: 1.0,
            }),
            &[&["lf"], &["lb"], &["rb"], &["rf"]],
        )
    }

    #[test]
    fn test_action_lifecycle() {
        let mut r = mecanum_rig();
        assert!(r.drive.is_configured());

        let traj = LineTrajectory::new(Pose2D::identity(), 20.0, 2.0);
        let mut action = r.drive.follow(Box::new(traj));
        assert_eq!(action.state(), ActionState::NotStarted);

        for t in &[0.0, 1.0, 2.0] {
            r.clock.set(*t);
            assert_eq!(action.step(&mut r.drive), ActionStatus::Running);
            assert!(r.motors.iter().all(|m| m.power() > 0.0));
        }

        r.clock.set(2.1);
        assert_eq!(action.step(&mut r.drive), ActionStatus::NotRunning);
        assert_eq!(action.state(), ActionState::Finished);
        assert!(r.motors.iter().all(|m| m.power() == 0.0));

        // Never restarts
        r.clock.set(2.2);
        assert_eq!(action.step(&mut r.drive), ActionStatus::NotRunning);
    }

    #[test]
    fn test_voltage_compensation() {
        let mut r = mecanum_rig();
        let target = LineTrajectory::new(Pose2D::identity(), 20.0, 2.0).get(0.0);

        r.drive.track(ActionKind::FollowPath, &target);
        let full = r.motors[0].power();

        r.battery.set(9.0);
        r.drive.track(ActionKind::FollowPath, &target);
        let sagged = r.motors[0].power();

        assert!((full - 2.0 / 12.0).abs() < 1e-12);
        assert!(sagged > full);

        // Unusable voltage stops the wheels
        r.battery.set(0.0);
        r.drive.track(ActionKind::FollowPath, &target);
        assert!(r.drive.report().voltage_invalid);
        assert!(r.motors.iter().all(|m| m.power() == 0.0));
    }

    #[test]
    fn test_tank_ganged_turn() {
        let mut r = rig(
            ChassisParams::Tank(TankParams { track_width: 10.0 }),
            &[&["l0", "l1"], &["r0", "r1"]],
        );

        let traj = TurnTrajectory::new(Pose2D::identity(), 1.0, 1.0);
        let mut action = r.drive.turn(Box::new(traj));

        assert_eq!(action.step(&mut r.drive), ActionStatus::Running);

        // Left side backwards, right side forwards, ganged motors identical
        let p: Vec<f64> = r.motors.iter().map(|m| m.power()).collect();
        assert!(p[0] < 0.0 && p[0] == p[1]);
        assert!(p[2] > 0.0 && p[2] == p[3]);
        assert_eq!(r.drive.report().cmd_vx, 0.0);
    }

    #[test]
    fn test_save_on_finish() {
        let mut r = mecanum_rig();

        let mut action = r.drive.follow(Box::new(LineTrajectory::new(Pose2D::identity(), 1.0, 0.5)));
        action.step(&mut r.drive);
        r.clock.set(1.0);
        action.step(&mut r.drive);

        assert_eq!(r.drive.store.load(DEFAULT_PERSIST_KEY), Some(Pose2D::identity()));
    }

    #[test]
    fn test_restore_on_new() {
        let mut ports = PortRegistry::new();
        ports.add_module("pinpoint", Box::new(FakeModule::default()));

        let clock = ManualClock::new(0.0);
        let odom = crate::odom::build(
            &OdomParams::AbsModule(AbsModuleParams { port: "pinpoint".into() }),
            &mut ports,
            Rc::new(clock.clone()),
        )
        .unwrap();

        let saved = Pose2D::new(-36.0, 60.0, 1.5);
        let mut store = MemPoseStore::default();
        store.save(DEFAULT_PERSIST_KEY, saved).unwrap();

        let drive = DriveCtrl::new(
            Err(LoadError::SwRootNotSet),
            Err(LoadError::SwRootNotSet),
            odom,
            &mut ports,
            Rc::new(clock.clone()),
            Box::new(store),
        );

        // Restored with the default key even though the drive itself isn't configured
        assert!(!drive.is_configured());
        assert_eq!(drive.odom().pose(), saved);
    }

    #[test]
    fn test_unconfigured() {
        let mut ports = PortRegistry::new();
        let clock = ManualClock::new(0.0);

        let mut drive = DriveCtrl::new(
            Err(LoadError::SwRootNotSet),
            Err(LoadError::SwRootNotSet),
            Box::new(UnconfiguredOdom),
            &mut ports,
            Rc::new(clock.clone()),
            Box::new(MemPoseStore::default()),
        );
        assert!(!drive.is_configured());

        drive.drive(1.0, 0.0, 0.0);
        drive.command(&DriveCmd::Stop);
        assert_eq!(drive.last_powers(), None);

        // Actions still run to completion
        let mut action = drive.follow(Box::new(LineTrajectory::new(Pose2D::identity(), 1.0, 1.0)));
        assert_eq!(action.step(&mut drive), ActionStatus::Running);
        clock.set(1.5);
        assert_eq!(action.step(&mut drive), ActionStatus::NotRunning);
    }

    #[test]
    fn test_manual_drive() {
        let mut r = mecanum_rig();

        r.drive.drive(2.0, 0.0, 0.0);
        assert!(r.motors.iter().all(|m| m.power() == 1.0));

        r.drive.command(&DriveCmd::Stop);
        assert!(r.motors.iter().all(|m| m.power() == 0.0));

        r.drive.command(&DriveCmd::Drive { x: 0.0, y: 0.0, turn: 0.5 });
        assert_eq!(r.motors[0].power(), -0.5);
        assert_eq!(r.motors[3].power(), 0.5);
    }

    #[test]
    fn test_manual_drive_invalid_input() {
        let mut r = mecanum_rig();

        r.drive.drive(0.5, 0.0, 0.0);
        assert!(r.motors.iter().all(|m| m.power() == 0.5));

        r.drive.drive(std::f64::NAN, 0.0, 0.0);
        assert!(r.motors.iter().all(|m| m.power() == 0.0));

        r.drive.drive(0.0, 0.0, std::f64::INFINITY);
        assert!(r.motors.iter().all(|m| m.power() == 0.0));
    }

    #[test]
    fn test_field_centric_initial_heading() {
        let module = FakeModule::default();
        let mut ports = PortRegistry::new();
        ports.add_module("pinpoint", Box::new(module.clone()));
        ports.add_voltage("battery", Box::new(FakeVoltage::new(12.0)));

        let names = ["lf", "lb", "rb", "rf"];
        let motors: Vec<FakeMotor> = names.iter().map(|_| FakeMotor::default()).collect();
        for (name, m) in names.iter().zip(motors.iter()) {
            ports.add_actuator(*name, Box::new(m.clone()));
        }

        let clock = ManualClock::new(0.0);
        let odom = crate::odom::build(
            &OdomParams::AbsModule(AbsModuleParams { port: "pinpoint".into() }),
            &mut ports,
            Rc::new(clock.clone()),
        )
        .unwrap();

        let loco_params = loco_ctrl::Params {
            chassis: ChassisParams::Mecanum(MecanumParams {
                track_width: 14.0,
                wheelbase: 12.0,
                lateral_multiplier: 1.0,
            }),
            speed_multiplier: 1.0,
            field_centric: true,
            field_centric_ref: FieldCentricRef::Initial,
        };

        let mut drive = DriveCtrl::new(
            Ok(drive_params(names.iter().map(|n| vec![n.to_string()]).collect())),
            Ok(loco_params),
            odom,
            &mut ports,
            Rc::new(clock.clone()),
            Box::new(MemPoseStore::default()),
        );

        // Reference taken from the first manual drive
        drive.update_pose_estimate();
        drive.drive(0.5, 0.0, 0.0);
        assert!(motors.iter().all(|m| m.power() == 0.5));

        // After a quarter turn anticlockwise the same request strafes right
        module.set_pose([0.0, 0.0, std::f64::consts::FRAC_PI_2], [0.0; 3]);
        clock.advance(0.02);
        drive.update_pose_estimate();
        drive.drive(0.5, 0.0, 0.0);

        let powers: Vec<f64> = motors.iter().map(|m| m.power()).collect();
        for (p, e) in powers.iter().zip([0.5, -0.5, 0.5, -0.5].iter()) {
            assert!((p - e).abs() < 1e-9, "{:?}", powers);
        }
    }
}
