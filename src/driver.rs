//! Command sources for the vehicle.
//!
//! The path follower is one [Driver]; a [ManualDriver] fed by some input
//! device is another. [DriverSelector] picks which one actuates the vehicle.

use log::info;

/// Actuation command for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// In `[-1, 1]`, positive steers left.
    pub steering: f64,
    /// In `[0, 1]`.
    pub throttle: f64,
    /// In `[0, 1]`.
    pub braking: f64,
}

impl Default for Command {
    fn default() -> Self {
        Self {
            steering: 0.0,
            throttle: 0.0,
            braking: 0.0,
        }
    }
}

pub trait Driver {
    fn command(&self) -> Command;
}

/// Holds whatever values were last set by the operator.
///
/// Setters clamp to the command ranges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualDriver {
    command: Command,
}

impl ManualDriver {
    pub fn set_steering(&mut self, steering: f64) {
        self.command.steering = steering.clamp(-1.0, 1.0);
    }

    pub fn set_throttle(&mut self, throttle: f64) {
        self.command.throttle = throttle.clamp(0.0, 1.0);
    }

    pub fn set_braking(&mut self, braking: f64) {
        self.command.braking = braking.clamp(0.0, 1.0);
    }

    /// Takes over all three channels at once.
    pub fn hold(&mut self, command: Command) {
        self.set_steering(command.steering);
        self.set_throttle(command.throttle);
        self.set_braking(command.braking);
    }
}

impl Driver for ManualDriver {
    fn command(&self) -> Command {
        self.command
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    Follower,
    Manual,
}

/// Chooses between the follower and the manual driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverSelector {
    manual: ManualDriver,
    current: DriverKind,
}

impl Default for DriverSelector {
    fn default() -> Self {
        Self {
            manual: ManualDriver::default(),
            current: DriverKind::Follower,
        }
    }
}

impl DriverSelector {
    pub fn current(&self) -> DriverKind {
        self.current
    }

    pub fn using_manual(&self) -> bool {
        self.current == DriverKind::Manual
    }

    pub fn manual_mut(&mut self) -> &mut ManualDriver {
        &mut self.manual
    }

    /// Switches to manual control, starting from the follower's last command
    /// so the hand-over is bumpless.
    pub fn select_manual<F: Driver + ?Sized>(&mut self, follower: &F) {
        if self.current != DriverKind::Manual {
            self.manual.hold(follower.command());
            self.current = DriverKind::Manual;
            info!("switched to manual driver");
        }
    }

    pub fn select_follower(&mut self) {
        if self.current != DriverKind::Follower {
            self.current = DriverKind::Follower;
            info!("switched to follower driver");
        }
    }

    pub fn command<F: Driver + ?Sized>(&self, follower: &F) -> Command {
        match self.current {
            DriverKind::Follower => follower.command(),
            DriverKind::Manual => self.manual.command(),
        }
    }
}
