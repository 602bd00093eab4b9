use crate::{
    constants::{DEFAULT_SPEED_KP, DEFAULT_TARGET_SPEED_MS},
    error::{ConfigurationError, Error},
    pid::{PidInit, TimedPid},
    vehicle::check_finite,
};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeedControllerInit {
    pub pid: PidInit,
    pub target_speed: f64,
}

impl SpeedControllerInit {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.pid.validate()?;

        let speed = self.target_speed;
        if !(speed.is_finite() && speed >= 0.0) {
            return Err(ConfigurationError::InvalidGain {
                name: "target_speed",
                value: speed,
            });
        }

        Ok(())
    }

    pub fn build(&self) -> SpeedController {
        let Self {
            ref pid,
            target_speed,
        } = *self;

        SpeedController {
            speed_pid: pid.build(),
            target_speed,
        }
    }
}

impl Default for SpeedControllerInit {
    fn default() -> Self {
        Self {
            pid: PidInit::proportional(DEFAULT_SPEED_KP),
            target_speed: DEFAULT_TARGET_SPEED_MS,
        }
    }
}

#[derive(Debug)]
pub struct SpeedController {
    speed_pid: TimedPid,
    target_speed: f64,
}

impl SpeedController {
    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    pub fn reset(&mut self, init: &SpeedControllerInit) {
        *self = init.build();
    }

    pub fn compute(
        &mut self,
        target_speed: f64,
        current_speed: f64,
        dt: f64,
    ) -> Result<PedalControl, Error> {
        check_finite("target speed", target_speed)?;
        check_finite("vehicle speed", current_speed)?;

        let output = self.speed_pid.step(target_speed - current_speed, dt)?.output;
        Ok(PedalControl::from_output(output))
    }

    /// Runs [compute](Self::compute) against the configured target speed.
    pub fn step(&mut self, current_speed: f64, dt: f64) -> Result<PedalControl, Error> {
        self.compute(self.target_speed, current_speed, dt)
    }

    pub fn integral(&self) -> f64 {
        self.speed_pid.integral()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PedalControl {
    pub throttle: f64,
    pub braking: f64,
}

impl PedalControl {
    /// Splits a signed command in `[-1, 1]` into throttle or braking.
    pub fn from_output(output: f64) -> Self {
        if output > 0.0 {
            Self {
                throttle: output,
                braking: 0.0,
            }
        } else {
            Self {
                throttle: 0.0,
                // adding 0.0 turns -0.0 into 0.0
                braking: -output + 0.0,
            }
        }
    }
}
