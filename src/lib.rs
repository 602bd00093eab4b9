//! Path-following steering and speed control with trajectory hot swap.
//!
//! Each tick the [HotSwapCoordinator] finds the nearest point on the active
//! path (the sentinel) and a point a look-ahead distance further along (the
//! target), steers towards the target and holds a cruise speed. Between ticks
//! a newly published trajectory can be polled in, replacing the path and both
//! controllers at once.

#[cfg(feature = "carla")]
pub mod carla;
pub mod config;
pub mod constants;
pub mod data_log;
pub mod driver;
pub mod error;
pub mod hot_swap;
pub mod look_ahead;
pub mod path;
pub mod path_file;
pub mod pid;
pub mod source;
pub mod speed_control;
pub mod steer_control;
pub mod vehicle;

pub use config::FollowerConfig;
pub use driver::{Command, Driver, DriverKind, DriverSelector, ManualDriver};
pub use error::{
    ConfigurationError, Error, InvalidPathError, InvalidTimestepError, InvalidVehicleStateError,
    Result,
};
pub use hot_swap::{FollowerOutput, HotSwapCoordinator, SharedCoordinator};
pub use look_ahead::{Locations, LookAheadLocator};
pub use path::{PathModel, PathPoint, Waypoint};
pub use source::{SharedTrajectory, Trajectory, TrajectorySource};
pub use speed_control::{PedalControl, SpeedController, SpeedControllerInit};
pub use steer_control::{SteerController, SteerControllerInit, SteerMode};
pub use vehicle::VehicleState;
