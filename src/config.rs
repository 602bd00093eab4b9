use crate::{
    constants::DEFAULT_PATH_HEIGHT_M,
    error::{ConfigurationError, Error},
    speed_control::SpeedControllerInit,
    steer_control::SteerControllerInit,
};
use serde::Deserialize;
use std::{fs::read_to_string, path::Path};

/// Startup configuration of the path follower.
///
/// ```toml
/// path_height = 0.5
///
/// [steer]
/// look_ahead_distance = 5.0
/// pid = { kp = 0.5, ki = 0.0, kd = 0.0 }
///
/// [speed]
/// target_speed = 12.0
/// pid = { kp = 0.4, ki = 0.0, kd = 0.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    pub steer: SteerControllerInit,
    pub speed: SpeedControllerInit,
    /// Height given to waypoints received as planar trajectories.
    pub path_height: f64,
}

impl FollowerConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.steer.validate()?;
        self.speed.validate()?;

        if !self.path_height.is_finite() {
            return Err(ConfigurationError::InvalidGain {
                name: "path_height",
                value: self.path_height,
            });
        }

        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigurationError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self, Error> {
        let text = read_to_string(file)?;
        Ok(Self::from_toml_str(&text)?)
    }
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            steer: SteerControllerInit::default(),
            speed: SpeedControllerInit::default(),
            path_height: DEFAULT_PATH_HEIGHT_M,
        }
    }
}
