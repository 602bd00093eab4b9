use anyhow::Result;
use carla::{
    client::{Client, Vehicle},
    rpc::VehicleControl,
};
use carla_path_follower::{
    FollowerConfig, HotSwapCoordinator, SharedTrajectory, Trajectory, VehicleState,
};
use clap::Parser;
use log::{debug, info, warn};
use rand::prelude::*;
use std::{path::PathBuf, thread, time::Duration};

#[derive(Parser)]
struct Opts {
    #[clap(default_value = "127.0.0.1")]
    pub address: String,
    #[clap(default_value = "2000")]
    pub port: u16,
    /// TOML file with controller gains.
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Length of the published trajectories in meters.
    #[clap(long, default_value = "50")]
    pub length: f64,
}

fn main() -> Result<()> {
    let Opts {
        address,
        port,
        config,
        length,
    } = Opts::parse();

    fern::Dispatch::new()
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr())
        .apply()?;

    let config = match config {
        Some(file) => FollowerConfig::load(file)?,
        None => FollowerConfig::default(),
    };

    // Connect to Carla server
    let client = Client::connect(&address, port, None);
    let mut world = client.world();

    // Spawn a car
    let mut vehicle: Vehicle = {
        let mut rng = rand::thread_rng();

        let spawn_point = {
            let spawn_points = world.map().recommended_spawn_points();
            let index = rng.gen_range(0..spawn_points.len());
            spawn_points.get(index).unwrap()
        };

        world
            .actor_builder("vehicle.tesla.model3")?
            .spawn_vehicle(&spawn_point)?
    };

    // Publish a straight trajectory ahead of the car, then keep bending its
    // end point sideways by one meter every second.
    let start = VehicleState::from_carla(&vehicle);
    let (sin, cos) = start.heading.sin_cos();
    let (x0, y0) = (start.position.x, start.position.y);
    let trajectory_at = move |offset: f64| {
        Trajectory::new(
            vec![x0, x0 + length * cos - offset * sin],
            vec![y0, y0 + length * sin + offset * cos],
        )
    };

    let initial = trajectory_at(0.0);
    let shared = SharedTrajectory::new();
    shared.publish(initial.clone());
    {
        let publisher = shared.clone();
        thread::spawn(move || {
            let mut offset = 0.0;
            loop {
                thread::sleep(Duration::from_secs(1));
                offset += 1.0;
                publisher.publish(trajectory_at(offset));
            }
        });
    }

    let mut coordinator = HotSwapCoordinator::new(config, &initial.xs, &initial.ys)?;
    let mut source = shared;

    // Get initial world ID and elapsed simulation time.
    let snapshot = world.wait_for_tick();
    let mut world_id = snapshot.id();
    let mut time_secs = snapshot.timestamp().elapsed_seconds;

    loop {
        let snapshot = world.wait_for_tick();

        // If the world is reloaded, the tick is skipped.
        let curr_id = snapshot.id();
        let curr_secs = snapshot.timestamp().elapsed_seconds;
        let time_delta_secs = if curr_id != world_id {
            0.0
        } else {
            curr_secs - time_secs
        };
        world_id = curr_id;
        time_secs = curr_secs;

        if let Err(err) = coordinator.poll_source(&mut source) {
            warn!("ignoring trajectory update: {}", err);
        }

        if time_delta_secs <= 0.0 {
            continue;
        }

        let state = VehicleState::from_carla(&vehicle);
        let output = coordinator.step(&state, time_delta_secs)?;
        debug!(
            "sentinel ({:.2}, {:.2}), target ({:.2}, {:.2})",
            output.sentinel.x, output.sentinel.y, output.target.x, output.target.y
        );

        if output.path_complete {
            info!("reached the end of the path");
            vehicle.apply_control(&VehicleControl {
                throttle: 0.0,
                steer: 0.0,
                brake: 1.0,
                hand_brake: true,
                reverse: false,
                manual_gear_shift: false,
                gear: 0,
            });
            break;
        }

        vehicle.apply_control(&VehicleControl::from(&output.command));
    }

    Ok(())
}
