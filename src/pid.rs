use crate::{
    constants::{DEFAULT_INTEGRAL_LIMIT, MAX_OUTPUT_LIMIT},
    error::{ConfigurationError, InvalidTimestepError},
};
use pid::Pid;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PidInit {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral_limit: f64,
    pub output_limit: f64,
}

impl PidInit {
    pub fn proportional(kp: f64) -> Self {
        Self {
            kp,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let Self {
            kp,
            ki,
            kd,
            integral_limit,
            output_limit,
        } = *self;

        for (name, value) in [("kp", kp), ("ki", ki), ("kd", kd)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidGain { name, value });
            }
        }
        if !integral_limit.is_finite() || integral_limit < 0.0 {
            return Err(ConfigurationError::InvalidGain {
                name: "integral_limit",
                value: integral_limit,
            });
        }
        if !(output_limit > 0.0 && output_limit <= MAX_OUTPUT_LIMIT) {
            return Err(ConfigurationError::OutOfRange {
                name: "output_limit",
                value: output_limit,
                max: MAX_OUTPUT_LIMIT,
            });
        }

        Ok(())
    }

    pub fn build(&self) -> TimedPid {
        let Self {
            kp,
            ki,
            kd,
            integral_limit,
            output_limit,
        } = *self;

        TimedPid {
            pid: Pid::new(
                kp,
                0.0,
                0.0,
                f64::MAX,
                integral_limit,
                f64::MAX,
                output_limit,
                0.0,
            ),
            ki,
            kd,
            integral: 0.0,
        }
    }
}

impl Default for PidInit {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            integral_limit: DEFAULT_INTEGRAL_LIMIT,
            output_limit: MAX_OUTPUT_LIMIT,
        }
    }
}

pub fn check_timestep(dt: f64) -> Result<(), InvalidTimestepError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(InvalidTimestepError { dt })
    }
}

/// A [Pid] driven by an explicit time step.
///
/// The underlying controller has no notion of time, so the integral and
/// derivative gains are rescaled by `dt` before every update. The error is
/// fed in as a measurement against a zero setpoint, which makes the
/// derivative-on-measurement of [Pid] equal to `(error - prev_error) / dt`.
/// The first update after construction has no derivative contribution.
#[derive(Debug)]
pub struct TimedPid {
    pid: Pid<f64>,
    ki: f64,
    kd: f64,
    integral: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidOutput {
    pub error: f64,
    pub output: f64,
}

impl TimedPid {
    pub fn step(&mut self, error: f64, dt: f64) -> Result<PidOutput, InvalidTimestepError> {
        check_timestep(dt)?;

        let Self {
            ref mut pid,
            ki,
            kd,
            ..
        } = *self;

        pid.ki = ki * dt;
        pid.kd = kd / dt;
        let control = pid.next_control_output(-error);
        self.integral = control.i;

        Ok(PidOutput {
            error,
            output: control.output,
        })
    }

    /// Integral term after the last update.
    pub fn integral(&self) -> f64 {
        self.integral
    }
}
