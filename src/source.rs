//! External trajectory stores polled by the follower.

use std::sync::{Arc, Mutex};

/// A planar trajectory as published by a planner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Trajectory {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self { xs, ys }
    }
}

pub trait TrajectorySource {
    /// Returns the currently published trajectory, if any.
    ///
    /// Both arrays must come from the same publication.
    fn read(&mut self) -> Option<Trajectory>;
}

/// A trajectory slot shared between a publisher and the control loop.
///
/// Both coordinate arrays are published under one lock, so readers never see
/// a new `xs` paired with an old `ys`.
#[derive(Debug, Clone, Default)]
pub struct SharedTrajectory {
    slot: Arc<Mutex<Option<Trajectory>>>,
}

impl SharedTrajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, trajectory: Trajectory) {
        // a poisoned slot still holds a complete trajectory
        let mut slot = self.slot.lock().unwrap_or_else(|err| err.into_inner());
        *slot = Some(trajectory);
    }

    pub fn get(&self) -> Option<Trajectory> {
        let slot = self.slot.lock().unwrap_or_else(|err| err.into_inner());
        slot.clone()
    }
}

impl TrajectorySource for SharedTrajectory {
    fn read(&mut self) -> Option<Trajectory> {
        self.get()
    }
}

impl<F> TrajectorySource for F
where
    F: FnMut() -> Option<Trajectory>,
{
    fn read(&mut self) -> Option<Trajectory> {
        self()
    }
}
