//! Ownership of the active path and controllers, and replacement of both when
//! a new trajectory is published.

use crate::{
    config::FollowerConfig,
    data_log::DataLog,
    driver::{Command, Driver},
    error::{Error, InvalidPathError},
    path::{PathModel, Waypoint},
    pid::check_timestep,
    source::{Trajectory, TrajectorySource},
    speed_control::SpeedController,
    steer_control::SteerController,
    vehicle::VehicleState,
};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

pub type SharedCoordinator = Arc<Mutex<HotSwapCoordinator>>;

/// Result of one control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerOutput {
    pub command: Command,
    pub sentinel: Waypoint,
    pub target: Waypoint,
    pub path_complete: bool,
}

/// A path together with the controllers tuned for following it. Always
/// replaced as a whole.
#[derive(Debug)]
struct ActiveSet {
    path: PathModel,
    steer: SteerController,
    speed: SpeedController,
}

impl ActiveSet {
    fn new(config: &FollowerConfig, path: PathModel) -> Self {
        Self {
            path,
            steer: config.steer.build(),
            speed: config.speed.build(),
        }
    }
}

/// Follows the latest valid trajectory.
///
/// [poll](Self::poll) compares the offered arrays against the last accepted
/// ones element by element, which costs O(n) per call.
#[derive(Debug)]
pub struct HotSwapCoordinator {
    config: FollowerConfig,
    active: ActiveSet,
    snapshot: Trajectory,
    last_command: Command,
    retired_log: Option<DataLog>,
    swaps: usize,
}

impl HotSwapCoordinator {
    pub fn new(config: FollowerConfig, xs: &[f64], ys: &[f64]) -> Result<Self, Error> {
        config.validate()?;
        let path = PathModel::from_xy(xs, ys, config.path_height)?;
        info!(
            "following initial path of {} points, {:.2} m long",
            path.len(),
            path.total_length()
        );

        Ok(Self {
            active: ActiveSet::new(&config, path),
            config,
            snapshot: Trajectory::new(xs.to_vec(), ys.to_vec()),
            last_command: Command::default(),
            retired_log: None,
            swaps: 0,
        })
    }

    pub fn into_shared(self) -> SharedCoordinator {
        Arc::new(Mutex::new(self))
    }

    /// Swaps in a new path if `xs`/`ys` differ from the last accepted
    /// trajectory.
    ///
    /// Returns whether a swap happened. A rejected trajectory leaves the
    /// current path and controllers untouched and is not remembered, so it is
    /// reported again on the next poll.
    pub fn poll(&mut self, xs: &[f64], ys: &[f64]) -> Result<bool, InvalidPathError> {
        if self.snapshot.xs == xs && self.snapshot.ys == ys {
            return Ok(false);
        }

        let path = match PathModel::from_xy(xs, ys, self.config.path_height) {
            Ok(path) => path,
            Err(err) => {
                warn!("rejected trajectory update, keeping current path: {}", err);
                return Err(err);
            }
        };

        let mut retired = std::mem::replace(&mut self.active, ActiveSet::new(&self.config, path));
        self.snapshot = Trajectory::new(xs.to_vec(), ys.to_vec());
        self.swaps += 1;

        if retired.steer.is_data_available() {
            debug!(
                "retiring data log of {} entries",
                retired.steer.data_log().len()
            );
            if let Some(unclaimed) = self.retired_log.replace(retired.steer.take_data_log()) {
                warn!(
                    "dropping unclaimed retired data log of {} entries",
                    unclaimed.len()
                );
            }
        }

        info!(
            "swapped to path of {} points, {:.2} m long",
            self.active.path.len(),
            self.active.path.total_length()
        );
        Ok(true)
    }

    /// Reads the source and polls with what it holds. An empty source is not
    /// a change.
    pub fn poll_source<S>(&mut self, source: &mut S) -> Result<bool, InvalidPathError>
    where
        S: TrajectorySource + ?Sized,
    {
        match source.read() {
            Some(Trajectory { xs, ys }) => self.poll(&xs, &ys),
            None => Ok(false),
        }
    }

    /// Runs one control tick against the active path.
    ///
    /// A non-finite vehicle state or time step aborts the tick before any
    /// controller state or marker location changes.
    pub fn step(&mut self, vehicle: &VehicleState, dt: f64) -> Result<FollowerOutput, Error> {
        vehicle.validate()?;
        check_timestep(dt)?;

        let ActiveSet {
            ref path,
            ref mut steer,
            ref mut speed,
        } = self.active;

        let locations = steer.locate(path, &vehicle.position);
        let sentinel = locations.sentinel.point;
        let steering = steer.compute(&sentinel, &locations.target, vehicle.heading, dt)?;
        let pedal = speed.step(vehicle.speed, dt)?;

        let command = Command {
            steering,
            throttle: pedal.throttle,
            braking: pedal.braking,
        };
        self.last_command = command;

        Ok(FollowerOutput {
            command,
            sentinel,
            target: locations.target,
            path_complete: locations.path_complete,
        })
    }

    pub fn path(&self) -> &PathModel {
        &self.active.path
    }

    pub fn steer_controller(&self) -> &SteerController {
        &self.active.steer
    }

    pub fn steer_controller_mut(&mut self) -> &mut SteerController {
        &mut self.active.steer
    }

    pub fn speed_controller(&self) -> &SpeedController {
        &self.active.speed
    }

    pub fn config(&self) -> &FollowerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &Trajectory {
        &self.snapshot
    }

    /// Number of accepted trajectory changes since construction.
    pub fn swap_count(&self) -> usize {
        self.swaps
    }

    /// Data collected by the controllers of a path that has since been
    /// replaced. Holds the most recent such log only, an unclaimed older one
    /// is dropped with a warning.
    pub fn take_retired_log(&mut self) -> Option<DataLog> {
        self.retired_log.take()
    }
}

impl Driver for HotSwapCoordinator {
    fn command(&self) -> Command {
        self.last_command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::PidInit;

    fn config() -> FollowerConfig {
        let mut config = FollowerConfig::default();
        config.steer.pid = PidInit {
            kp: 0.5,
            ki: 0.5,
            ..PidInit::default()
        };
        config
    }

    fn coordinator() -> HotSwapCoordinator {
        HotSwapCoordinator::new(config(), &[0.0, 10.0], &[0.0, 0.0]).unwrap()
    }

    #[test]
    fn rejects_invalid_initial_path() {
        let err = HotSwapCoordinator::new(FollowerConfig::default(), &[0.0], &[0.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidPath(InvalidPathError::TooFewPoints(1))
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = FollowerConfig::default();
        config.steer.look_ahead_distance = -1.0;
        let err = HotSwapCoordinator::new(config, &[0.0, 1.0], &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn unchanged_trajectory_is_not_a_swap() {
        let mut coord = coordinator();
        assert_eq!(coord.poll(&[0.0, 10.0], &[0.0, 0.0]), Ok(false));
        assert_eq!(coord.swap_count(), 0);
    }

    #[test]
    fn length_change_is_a_change() {
        let mut coord = coordinator();
        assert_eq!(
            coord.poll(&[0.0, 10.0, 20.0], &[0.0, 0.0, 0.0]),
            Ok(true)
        );
        assert_eq!(coord.path().len(), 3);
    }

    #[test]
    fn swap_resets_controller_state() {
        let mut coord = coordinator();
        let vehicle = VehicleState::new(Waypoint::new(0.0, 0.0, 0.5), -0.5, 0.0);
        for _ in 0..10 {
            coord.step(&vehicle, 0.1).unwrap();
        }
        assert!(coord.steer_controller().integral() > 0.0);

        assert_eq!(coord.poll(&[0.0, 0.0], &[0.0, 10.0]), Ok(true));
        assert_eq!(coord.steer_controller().integral(), 0.0);
        assert_eq!(coord.speed_controller().integral(), 0.0);
        assert_eq!(coord.path().end(), Waypoint::new(0.0, 10.0, 0.5));
        assert_eq!(coord.snapshot().ys, vec![0.0, 10.0]);
    }

    #[test]
    fn rejected_update_keeps_active_path() {
        let mut coord = coordinator();
        let before = coord.path().clone();

        assert_eq!(
            coord.poll(&[0.0, 5.0, 10.0], &[0.0, 1.0]),
            Err(InvalidPathError::LengthMismatch { xs: 3, ys: 2 })
        );
        assert_eq!(
            coord.poll(&[3.0], &[4.0]),
            Err(InvalidPathError::TooFewPoints(1))
        );
        assert!(coord.poll(&[0.0, f64::INFINITY], &[0.0, 1.0]).is_err());

        assert_eq!(coord.path(), &before);
        assert_eq!(coord.snapshot().xs, vec![0.0, 10.0]);
        assert_eq!(coord.swap_count(), 0);

        // still reported on the next poll
        assert!(coord.poll(&[3.0], &[4.0]).is_err());
        // and a valid update goes through afterwards
        assert_eq!(coord.poll(&[0.0, 20.0], &[0.0, 0.0]), Ok(true));
    }

    #[test]
    fn swap_retires_collected_data() {
        let mut coord = coordinator();
        let vehicle = VehicleState::new(Waypoint::new(1.0, 0.0, 0.5), 0.0, 3.0);

        coord.steer_controller_mut().start_data_collection();
        coord.step(&vehicle, 0.05).unwrap();
        coord.step(&vehicle, 0.05).unwrap();

        coord.poll(&[0.0, 10.0], &[0.0, 5.0]).unwrap();
        assert!(!coord.steer_controller().is_data_collection_enabled());
        assert!(!coord.steer_controller().is_data_available());

        let retired = coord.take_retired_log().unwrap();
        assert_eq!(retired.len(), 2);
        assert!(coord.take_retired_log().is_none());
    }

    #[test]
    fn only_latest_retired_log_is_kept() {
        let mut coord = coordinator();
        let vehicle = VehicleState::new(Waypoint::new(1.0, 0.0, 0.5), 0.0, 3.0);

        coord.steer_controller_mut().start_data_collection();
        coord.step(&vehicle, 0.05).unwrap();
        coord.poll(&[0.0, 10.0], &[0.0, 5.0]).unwrap();

        coord.steer_controller_mut().start_data_collection();
        for _ in 0..3 {
            coord.step(&vehicle, 0.05).unwrap();
        }
        coord.poll(&[0.0, 10.0], &[0.0, 6.0]).unwrap();

        assert_eq!(coord.take_retired_log().map(|log| log.len()), Some(3));
        assert!(coord.take_retired_log().is_none());
    }

    #[test]
    fn non_finite_vehicle_state_aborts_tick() {
        let mut coord = coordinator();
        let good = VehicleState::new(Waypoint::new(2.0, 1.0, 0.5), 0.3, 4.0);
        let bad_states = [
            VehicleState::new(Waypoint::new(2.0, 1.0, 0.5), f64::NAN, f64::NAN),
            VehicleState::new(Waypoint::new(f64::NAN, 1.0, 0.5), 0.3, 4.0),
            VehicleState::new(Waypoint::new(2.0, 1.0, 0.5), 0.3, f64::INFINITY),
        ];

        for bad in bad_states {
            assert!(matches!(
                coord.step(&bad, 0.05),
                Err(Error::InvalidVehicleState(_))
            ));
        }
        assert_eq!(coord.command(), Command::default());
        assert_eq!(coord.steer_controller().integral(), 0.0);
        assert_eq!(coord.speed_controller().integral(), 0.0);

        for _ in 0..3 {
            let Command {
                steering,
                throttle,
                braking,
            } = coord.step(&good, 0.05).unwrap().command;
            assert!((-1.0..=1.0).contains(&steering));
            assert!((0.0..=1.0).contains(&throttle));
            assert!((0.0..=1.0).contains(&braking));
            assert!(steering < 0.0);
            assert!(throttle > 0.0);
        }
    }

    #[test]
    fn aborted_tick_keeps_marker_locations() {
        let mut coord = coordinator();
        coord
            .step(&VehicleState::new(Waypoint::new(2.0, 1.0, 0.5), 0.0, 0.0), 0.05)
            .unwrap();

        let moved = VehicleState::new(Waypoint::new(4.0, 1.0, 0.5), 0.0, 0.0);
        assert!(coord.step(&moved, 0.0).is_err());
        assert!(coord.step(&moved, f64::NAN).is_err());

        let steer = coord.steer_controller();
        assert_eq!(steer.sentinel_location(), Waypoint::new(2.0, 0.0, 0.5));
        assert_eq!(steer.target_location(), Waypoint::new(7.0, 0.0, 0.5));
    }

    #[test]
    fn follower_reports_last_command() {
        let mut coord = coordinator();
        assert_eq!(coord.command(), Command::default());

        let vehicle = VehicleState::new(Waypoint::new(0.0, 0.0, 0.5), 0.0, 0.0);
        let output = coord.step(&vehicle, 0.01).unwrap();
        assert_eq!(coord.command(), output.command);
        assert!(output.command.throttle > 0.0);
    }

    #[test]
    fn invalid_dt_aborts_tick() {
        let mut coord = coordinator();
        let vehicle = VehicleState::default();
        assert!(matches!(
            coord.step(&vehicle, 0.0),
            Err(Error::InvalidTimestep(_))
        ));
        assert_eq!(coord.command(), Command::default());
    }

    #[test]
    fn empty_source_is_not_a_change() {
        let mut coord = coordinator();
        let mut source = || -> Option<Trajectory> { None };
        assert_eq!(coord.poll_source(&mut source), Ok(false));
    }
}
