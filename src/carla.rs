//! Glue between the follower and the Carla simulator.
//!
//! Carla reports poses in a left-handed frame (Y to the right) and steers
//! right for positive values. The follower works in a right-handed frame with
//! Y to the left, so Y, yaw and steering change sign at this boundary.

use crate::{driver::Command, path::Waypoint, vehicle::VehicleState};
use carla::{
    client::{ActorBase, Vehicle},
    rpc::VehicleControl,
};

impl VehicleState {
    pub fn from_carla(vehicle: &Vehicle) -> Self {
        let transform = vehicle.transform();
        let location = transform.translation.vector;
        let (_, _, yaw) = transform.rotation.euler_angles();

        Self {
            position: Waypoint::new(location.x as f64, -location.y as f64, location.z as f64),
            heading: -yaw as f64,
            speed: vehicle.velocity().norm() as f64,
        }
    }
}

impl From<&Command> for VehicleControl {
    fn from(command: &Command) -> Self {
        let Command {
            steering,
            throttle,
            braking,
        } = *command;

        VehicleControl {
            throttle: throttle as f32,
            steer: -steering as f32,
            brake: braking as f32,
            hand_brake: false,
            reverse: false,
            manual_gear_shift: false,
            gear: 0,
        }
    }
}
