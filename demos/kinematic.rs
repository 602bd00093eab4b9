//! Follows a moving trajectory with a kinematic bicycle model, no simulator
//! required.
//!
//! A publisher thread plays the role of the planner: every period it moves
//! the end point of a two point trajectory one meter further to the left.

use anyhow::Result;
use carla_path_follower::{
    path_file, Command, DriverSelector, FollowerConfig, HotSwapCoordinator, SharedTrajectory,
    Trajectory, VehicleState, Waypoint,
};
use clap::Parser;
use log::{info, warn};
use std::{fs::File, path::PathBuf, thread, time::Duration};

const WHEELBASE_M: f64 = 3.0;
const MAX_STEER_RAD: f64 = 0.6;
const MAX_ACCEL_MS2: f64 = 3.0;
const MAX_DECEL_MS2: f64 = 8.0;

#[derive(Parser)]
struct Opts {
    /// TOML file with controller gains.
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Simulated seconds to run.
    #[clap(long, default_value = "20")]
    pub duration: f64,
    /// Control period in seconds.
    #[clap(long, default_value = "0.01")]
    pub step: f64,
    /// Milliseconds between trajectory publications.
    #[clap(long, default_value = "1000")]
    pub publish_ms: u64,
    /// Hand control to a braking manual driver from this time on.
    #[clap(long)]
    pub manual_from: Option<f64>,
    /// Write the steering data log here.
    #[clap(long)]
    pub data_log: Option<PathBuf>,
    /// Write the last followed path here.
    #[clap(long)]
    pub path_out: Option<PathBuf>,
    #[clap(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy)]
struct Bicycle {
    state: VehicleState,
}

impl Bicycle {
    fn advance(&mut self, command: &Command, dt: f64) {
        let VehicleState {
            position,
            heading,
            speed,
        } = self.state;

        let steer_angle = command.steering * MAX_STEER_RAD;
        let accel = command.throttle * MAX_ACCEL_MS2 - command.braking * MAX_DECEL_MS2;
        let speed = (speed + accel * dt).max(0.0);
        let heading = heading + speed / WHEELBASE_M * steer_angle.tan() * dt;
        let (sin, cos) = heading.sin_cos();

        self.state = VehicleState {
            position: Waypoint::new(
                position.x + speed * cos * dt,
                position.y + speed * sin * dt,
                position.z,
            ),
            heading,
            speed,
        };
    }
}

fn trajectory_at(offset: f64) -> Trajectory {
    Trajectory::new(vec![0.0, 200.0], vec![0.0, offset])
}

fn main() -> Result<()> {
    let Opts {
        config,
        duration,
        step,
        publish_ms,
        manual_from,
        data_log,
        path_out,
        verbose,
    } = Opts::parse();

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .chain(std::io::stderr())
        .apply()?;

    let config = match config {
        Some(file) => FollowerConfig::load(file)?,
        None => FollowerConfig::default(),
    };

    let shared = SharedTrajectory::new();
    let initial = trajectory_at(0.0);
    shared.publish(initial.clone());
    {
        let publisher = shared.clone();
        thread::spawn(move || {
            let mut offset = 0.0;
            loop {
                thread::sleep(Duration::from_millis(publish_ms));
                offset += 1.0;
                publisher.publish(trajectory_at(offset));
            }
        });
    }

    let mut coordinator = HotSwapCoordinator::new(config.clone(), &initial.xs, &initial.ys)?;
    if data_log.is_some() {
        coordinator.steer_controller_mut().start_data_collection();
    }

    let mut source = shared;
    let mut selector = DriverSelector::default();
    let mut vehicle = Bicycle {
        state: VehicleState::new(Waypoint::new(0.0, 0.0, config.path_height), 0.0, 0.0),
    };
    let mut retired = Vec::new();

    let ticks = (duration / step).ceil() as usize;
    for tick in 0..ticks {
        let time = tick as f64 * step;

        match coordinator.poll_source(&mut source) {
            Ok(true) => {
                retired.extend(coordinator.take_retired_log());
                if data_log.is_some() {
                    coordinator.steer_controller_mut().start_data_collection();
                }
            }
            Ok(false) => {}
            Err(err) => warn!("ignoring trajectory update: {}", err),
        }

        let output = coordinator.step(&vehicle.state, step)?;
        if output.path_complete {
            info!("reached the end of the path at t = {:.2}", time);
            break;
        }

        if manual_from.map_or(false, |from| time >= from) && !selector.using_manual() {
            selector.select_manual(&coordinator);
            selector.manual_mut().set_throttle(0.0);
            selector.manual_mut().set_braking(1.0);
        }

        let command = selector.command(&coordinator);
        vehicle.advance(&command, step);

        if tick % 100 == 0 {
            let VehicleState {
                position, speed, ..
            } = vehicle.state;
            info!(
                "t = {:6.2}  pos = ({:7.2}, {:6.2})  speed = {:5.2}  steer = {:+.3}",
                time, position.x, position.y, speed, command.steering
            );
        }

        thread::sleep(Duration::from_secs_f64(step));
    }

    if let Some(file) = data_log {
        retired.push(coordinator.steer_controller_mut().take_data_log());
        for (index, collected) in retired.iter().enumerate() {
            let name = file.with_extension(format!("{}.out", index));
            collected.write_to(File::create(&name)?)?;
            info!("data written to {}", name.display());
        }
    }

    if let Some(file) = path_out {
        path_file::save(&file, coordinator.path())?;
        info!("path written to {}", file.display());
    }

    info!("{} trajectory swaps", coordinator.swap_count());
    Ok(())
}
