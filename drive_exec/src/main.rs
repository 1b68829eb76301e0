//! Main drive executable entry point.
//!
//! # Architecture
//!
//! The executable runs the drive software against the simulation plant:
//!
//!     - Initialise the session, logging and parameters
//!     - Build the simulated ports, the odometry source and the drive controller
//!     - Main loop:
//!         - Step the simulation plant
//!         - Update the pose estimate
//!         - Step the current action, or execute the manual command
//!         - Archive the odometry state
//!
//! The pose reached at the end of each action is saved to the session directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::{
    rc::Rc,
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;

// Internal
use drive_lib::{
    loco_ctrl::{self, Chassis},
    odom::{self, OdomSource},
    persist::JsonPoseStore,
    pose::Pose2D,
    sim::{
        traj::{LineTrajectory, TurnTrajectory},
        SimParams, SimPlant,
    },
    traj_ctrl::{self, ActionStatus, DriveCtrl, FollowAction},
};
use hw_if::{eqpt::ManualClock, registry::PortRegistry, tc::DriveCmd};
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter, LogParams},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Demo line speed.
///
/// Units: inches/second
const DEMO_SPEED: f64 = 20.0;

/// Units: radians/second
const DEMO_TURN_RATE: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "drive_exec", about = "Runs the drive software on the simulated robot")]
struct Args {
    /// Maximum number of cycles to run for.
    #[structopt(short, long, default_value = "500")]
    cycles: u64,

    /// Run as fast as possible instead of in real time.
    #[structopt(long)]
    fast: bool,

    /// Manual command to execute instead of the demo trajectories.
    #[structopt(subcommand)]
    cmd: Option<DriveCmd>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("drive_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // A missing logger.toml falls back to debug on both outputs
    let (log_params, log_params_err) = match util::params::load::<LogParams>("logger.toml") {
        Ok(p) => (p, None),
        Err(e) => (
            LogParams::new(LevelFilter::Debug),
            Some(e),
        ),
    };

    logger_init(&log_params, &session)
        .wrap_err("Failed to initialise logging")?;

    if let Some(e) = log_params_err {
        warn!("Could not load logger params, using defaults: {}", e);
    }

    info!("Drive Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let sim_params: SimParams = util::params::load("sim.toml")
        .wrap_err("Could not load sim params")?;
    let loco_params: loco_ctrl::Params = util::params::load("loco_ctrl.toml")
        .wrap_err("Could not load loco_ctrl params")?;
    let drive_params: traj_ctrl::Params = util::params::load("drive_ctrl.toml")
        .wrap_err("Could not load drive_ctrl params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE SIMULATION ----

    let chassis = Chassis::from_params(&loco_params.chassis)
        .wrap_err("Invalid chassis parameters")?;

    let plant = SimPlant::new(sim_params, chassis);
    let mut ports = PortRegistry::new();
    plant.register_ports(&drive_params.wheel_ports, &drive_params.voltage_port, &mut ports);

    let clock = ManualClock::new(0.0);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let odom = odom::configure(
        util::params::load("odom.toml"),
        &mut ports,
        Rc::new(clock.clone()),
    );

    let store = JsonPoseStore::new(session.session_root.join("pose.json"));
    info!("Pose store file: {:?}", store.path());

    let mut drive = DriveCtrl::new(
        Ok(drive_params),
        Ok(loco_params),
        odom,
        &mut ports,
        Rc::new(clock.clone()),
        Box::new(store),
    );

    let mut arch_odom = Archiver::from_path(&session, "odom.csv")
        .wrap_err("Failed to create the odometry archive")?;
    let mut arch_drive = Archiver::from_path(&session, "drive_ctrl.csv")
        .wrap_err("Failed to create the drive archive")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let mut actions = match args.cmd {
        Some(_) => Vec::new(),
        None => demo_actions(drive.odom().pose()),
    };
    actions.reverse();
    let mut current: Option<FollowAction> = actions.pop();

    info!("Begining main loop\n");

    for cycle in 0..args.cycles {
        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        if cycle > 0 {
            clock.advance(CYCLE_PERIOD_S);
            plant.step(CYCLE_PERIOD_S);
        }

        drive.update_pose_estimate();

        // ---- DRIVE CONTROL ----

        if let Some(cmd) = args.cmd {
            drive.command(&cmd);
        }
        else {
            let finished = match current {
                Some(ref mut action) => action.step(&mut drive) == ActionStatus::NotRunning,
                None => {
                    info!("All actions complete after {} cycles", cycle);
                    break;
                }
            };

            if finished {
                current = actions.pop();
            }
        }

        // ---- ARCHIVING ----

        if let Err(e) = arch_odom.serialise(drive.odom().state()) {
            warn!("Could not archive the odometry state: {}", e);
        }
        if let Err(e) = arch_drive.serialise(drive.report()) {
            warn!("Could not archive the drive report: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        if args.fast {
            continue;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            ),
        }
    }

    // ---- SHUTDOWN ----

    drive.stop();
    drive.save_pose();

    info!("True pose: {:?}", plant.pose());
    info!("Estimated pose: {:?}", drive.odom().pose());

    info!("End of execution");

    Ok(())
}

/// A straight line followed by a quarter turn.
fn demo_actions(start: Pose2D) -> Vec<FollowAction> {
    let line = LineTrajectory::new(start, DEMO_SPEED, 2.0);
    let end = Pose2D::new(
        start.x + DEMO_SPEED * 2.0 * start.heading.cos(),
        start.y + DEMO_SPEED * 2.0 * start.heading.sin(),
        start.heading,
    );
    let turn = TurnTrajectory::new(end, DEMO_TURN_RATE, std::f64::consts::FRAC_PI_2 / DEMO_TURN_RATE);

    vec![
        FollowAction::follow_path(Box::new(line)),
        FollowAction::turn(Box::new(turn)),
    ]
}
