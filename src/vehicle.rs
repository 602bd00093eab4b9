use crate::{error::InvalidVehicleStateError, path::Waypoint};

/// Kinematic state supplied by the simulation each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Waypoint,
    /// Yaw about +Z in radians, zero along +X.
    pub heading: f64,
    /// Forward speed in m/s.
    pub speed: f64,
}

impl VehicleState {
    pub fn new(position: Waypoint, heading: f64, speed: f64) -> Self {
        Self {
            position,
            heading,
            speed,
        }
    }

    /// Fails on the first non-finite coordinate, heading or speed.
    pub fn validate(&self) -> Result<(), InvalidVehicleStateError> {
        let Self {
            position,
            heading,
            speed,
        } = *self;

        check_finite("vehicle x", position.x)?;
        check_finite("vehicle y", position.y)?;
        check_finite("vehicle z", position.z)?;
        check_finite("vehicle heading", heading)?;
        check_finite("vehicle speed", speed)
    }
}

pub(crate) fn check_finite(
    quantity: &'static str,
    value: f64,
) -> Result<(), InvalidVehicleStateError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidVehicleStateError { quantity, value })
    }
}

pub(crate) fn check_finite_point(
    quantity: &'static str,
    point: &Waypoint,
) -> Result<(), InvalidVehicleStateError> {
    match point.coords.iter().find(|c| !c.is_finite()) {
        Some(&value) => Err(InvalidVehicleStateError { quantity, value }),
        None => Ok(()),
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            position: Waypoint::origin(),
            heading: 0.0,
            speed: 0.0,
        }
    }
}
