use crate::{
    constants::{DEFAULT_LOOK_AHEAD_M, DEFAULT_STEER_KP, POINT_TOLERANCE_M},
    data_log::{DataLog, DataLogEntry},
    error::{ConfigurationError, Error},
    look_ahead::{Locations, LookAheadLocator},
    path::{PathModel, Waypoint},
    pid::{PidInit, TimedPid},
    vehicle::{check_finite, check_finite_point},
};
use log::debug;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SteerControllerInit {
    pub pid: PidInit,
    pub look_ahead_distance: f64,
}

impl SteerControllerInit {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.pid.validate()?;

        let distance = self.look_ahead_distance;
        if !(distance.is_finite() && distance > 0.0) {
            return Err(ConfigurationError::OutOfRange {
                name: "look_ahead_distance",
                value: distance,
                max: f64::INFINITY,
            });
        }

        Ok(())
    }

    pub fn build(&self) -> SteerController {
        let mut controller = SteerController::default();
        controller.reset(self);
        controller
    }
}

impl Default for SteerControllerInit {
    fn default() -> Self {
        Self {
            pid: PidInit::proportional(DEFAULT_STEER_KP),
            look_ahead_distance: DEFAULT_LOOK_AHEAD_M,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SteerMode {
    Uninitialized,
    Running,
    /// Running, and every update is appended to the data log.
    DataCollecting,
}

/// Steers towards the look-ahead target.
///
/// The error is the signed angle from the vehicle heading to the vector
/// joining the sentinel and the target, positive when the target lies to the
/// left (counter-clockwise about +Z). Steering commands follow the same sign.
#[derive(Debug)]
pub struct SteerController {
    pid: Option<TimedPid>,
    locator: LookAheadLocator,
    collecting: bool,
    log: DataLog,
    time_sec: f64,
    sentinel: Waypoint,
    target: Waypoint,
}

impl Default for SteerController {
    fn default() -> Self {
        Self {
            pid: None,
            locator: LookAheadLocator::new(0.0),
            collecting: false,
            log: DataLog::default(),
            time_sec: 0.0,
            sentinel: Waypoint::origin(),
            target: Waypoint::origin(),
        }
    }
}

impl SteerController {
    /// Installs new gains and look-ahead distance and clears the integral and
    /// previous error. The data log and collection mode are left as they are.
    pub fn reset(&mut self, init: &SteerControllerInit) {
        let SteerControllerInit {
            ref pid,
            look_ahead_distance,
        } = *init;

        self.pid = Some(pid.build());
        self.locator = LookAheadLocator::new(look_ahead_distance);
    }

    pub fn mode(&self) -> SteerMode {
        match (&self.pid, self.collecting) {
            (None, _) => SteerMode::Uninitialized,
            (Some(_), false) => SteerMode::Running,
            (Some(_), true) => SteerMode::DataCollecting,
        }
    }

    pub fn look_ahead_distance(&self) -> f64 {
        self.locator.distance()
    }

    /// Finds the sentinel and target for `position` and remembers them.
    pub fn locate(&mut self, path: &PathModel, position: &Waypoint) -> Locations {
        let locations = self.locator.locate(path, position);
        self.sentinel = locations.sentinel.point;
        self.target = locations.target;
        locations
    }

    pub fn compute(
        &mut self,
        sentinel: &Waypoint,
        target: &Waypoint,
        heading: f64,
        dt: f64,
    ) -> Result<f64, Error> {
        let pid = self.pid.as_mut().ok_or(ConfigurationError::Uninitialized)?;
        check_finite_point("sentinel", sentinel)?;
        check_finite_point("target", target)?;
        check_finite("vehicle heading", heading)?;

        let error = heading_error(sentinel, target, heading);
        let output = pid.step(error, dt)?.output;

        self.time_sec += dt;
        self.sentinel = *sentinel;
        self.target = *target;

        if self.collecting {
            self.log.push(DataLogEntry {
                time_sec: self.time_sec,
                sentinel: *sentinel,
                target: *target,
                error,
                output,
            });
        }

        Ok(output)
    }

    pub fn integral(&self) -> f64 {
        self.pid.as_ref().map(|pid| pid.integral()).unwrap_or(0.0)
    }

    pub fn sentinel_location(&self) -> Waypoint {
        self.sentinel
    }

    pub fn target_location(&self) -> Waypoint {
        self.target
    }

    pub fn start_data_collection(&mut self) {
        if !self.collecting {
            debug!("steering data collection started at t = {:.3}", self.time_sec);
            self.collecting = true;
        }
    }

    pub fn stop_data_collection(&mut self) {
        if self.collecting {
            debug!("steering data collection stopped at t = {:.3}", self.time_sec);
            self.collecting = false;
        }
    }

    pub fn is_data_collection_enabled(&self) -> bool {
        self.collecting
    }

    pub fn is_data_available(&self) -> bool {
        !self.log.is_empty()
    }

    pub fn data_log(&self) -> &DataLog {
        &self.log
    }

    /// Hands over the collected data and starts an empty log.
    pub fn take_data_log(&mut self) -> DataLog {
        std::mem::take(&mut self.log)
    }

    pub fn time_sec(&self) -> f64 {
        self.time_sec
    }
}

fn heading_error(sentinel: &Waypoint, target: &Waypoint, heading: f64) -> f64 {
    let dx = target.x - sentinel.x;
    let dy = target.y - sentinel.y;
    if dx.hypot(dy) <= POINT_TOLERANCE_M {
        return 0.0;
    }

    let (sin, cos) = heading.sin_cos();
    let cross = cos * dy - sin * dx;
    let dot = cos * dx + sin * dy;
    cross.atan2(dot)
}
