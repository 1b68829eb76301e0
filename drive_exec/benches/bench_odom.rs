//! # Odometry Benchmark

use std::rc::Rc;

use criterion::{criterion_group, criterion_main, Criterion};

use drive_lib::{
    loco_ctrl::{Chassis, ChassisParams, MecanumParams},
    odom::{self, OdomParams, OdomSource},
    pose::{Pose2D, Twist2D},
    sim::{SimParams, SimPlant},
};
use hw_if::{
    eqpt::{ActuatorPort, ManualClock},
    registry::PortRegistry,
};

const DT: f64 = 0.01;

fn odom_benchmark(c: &mut Criterion) {
    // ---- Build a simulated robot with three dead wheels ----

    let sim_params: SimParams = util::params::load_str(
        r#"
        kv = 0.1
        supply_voltage = 12.0
        in_per_tick = 0.002

        [[dead_wheels]]
        port = "par0"
        axis = "x"
        lever_ticks = 3500.0

        [[dead_wheels]]
        port = "par1"
        axis = "x"
        lever_ticks = -3500.0

        [[dead_wheels]]
        port = "perp"
        axis = "y"
        lever_ticks = 2500.0
        "#,
    )
    .unwrap();

    let odom_params: OdomParams = util::params::load_str(
        r#"
        kind = "three_wheel"
        par0_y_ticks = 3500.0
        par1_y_ticks = -3500.0
        perp_x_ticks = 2500.0
        in_per_tick = 0.002

        [par0]
        port = "par0"

        [par1]
        port = "par1"

        [perp]
        port = "perp"
        "#,
    )
    .unwrap();

    let chassis = Chassis::from_params(&ChassisParams::Mecanum(MecanumParams {
        track_width: 14.0,
        wheelbase: 12.0,
        lateral_multiplier: 1.0,
    }))
    .unwrap();

    let plant = SimPlant::new(sim_params, chassis);
    let mut ports = PortRegistry::new();
    let wheel_ports: Vec<Vec<String>> = ["lf", "lb", "rb", "rf"]
        .iter()
        .map(|n| vec![n.to_string()])
        .collect();
    plant.register_ports(&wheel_ports, "battery", &mut ports);

    // Drive the plant on an arc
    let powers = chassis.inverse(&Twist2D::new(20.0, 5.0, 0.5)).map(|v| v * 0.1 / 12.0);
    for (n, p) in wheel_ports.iter().zip(powers.values().iter()) {
        if let Ok(mut m) = ports.take_actuator(&n[0]) {
            m.set_power(*p);
        }
    }

    let clock = ManualClock::new(0.0);
    let mut source = odom::build(&odom_params, &mut ports, Rc::new(clock.clone())).unwrap();

    c.bench_function("three_wheel_update", |b| {
        b.iter(|| {
            clock.advance(DT);
            plant.step(DT);
            source.update();
        })
    });

    c.bench_function("pose_integrate", |b| {
        let incr = Twist2D::new(0.2, 0.05, 0.005);
        let mut pose = Pose2D::identity();
        b.iter(|| {
            pose = pose.integrate(&incr);
        })
    });
}

criterion_group!(benches, odom_benchmark);
criterion_main!(benches);
