use crate::path::{PathModel, PathPoint, Waypoint};

/// Sentinel and target locations for one control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locations {
    /// Nearest path point to the vehicle.
    pub sentinel: PathPoint,
    /// Path point a look-ahead distance past the sentinel.
    pub target: Waypoint,
    /// The look-ahead reaches past the end of the path.
    pub path_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAheadLocator {
    distance: f64,
}

impl LookAheadLocator {
    pub fn new(distance: f64) -> Self {
        Self { distance }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn locate(&self, path: &PathModel, position: &Waypoint) -> Locations {
        let sentinel = path.closest_point(position);
        let target_arc_length = sentinel.arc_length + self.distance;

        Locations {
            sentinel,
            target: path.point_at_arc_length(target_arc_length),
            path_complete: target_arc_length >= path.total_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight() -> PathModel {
        PathModel::new(vec![
            Waypoint::new(0.0, 0.0, 0.5),
            Waypoint::new(10.0, 0.0, 0.5),
        ])
        .unwrap()
    }

    #[test]
    fn target_is_ahead_of_sentinel() {
        let locator = LookAheadLocator::new(5.0);
        let loc = locator.locate(&straight(), &Waypoint::new(0.0, 0.0, 0.5));

        assert_eq!(loc.sentinel.point, Waypoint::new(0.0, 0.0, 0.5));
        assert_eq!(loc.target, Waypoint::new(5.0, 0.0, 0.5));
        assert!(!loc.path_complete);
    }

    #[test]
    fn offset_vehicle_projects_onto_path() {
        let locator = LookAheadLocator::new(2.0);
        let loc = locator.locate(&straight(), &Waypoint::new(3.0, -1.5, 0.5));

        assert_eq!(loc.sentinel.point, Waypoint::new(3.0, 0.0, 0.5));
        assert_eq!(loc.target, Waypoint::new(5.0, 0.0, 0.5));
    }

    #[test]
    fn target_clamps_at_path_end() {
        let locator = LookAheadLocator::new(5.0);
        let loc = locator.locate(&straight(), &Waypoint::new(8.0, 0.0, 0.5));

        assert_eq!(loc.target, Waypoint::new(10.0, 0.0, 0.5));
        assert!(loc.path_complete);
    }
}
