//! Piecewise-linear path through an ordered sequence of waypoints.
//!
//! A [PathModel] is immutable. Receiving a new trajectory means building a new
//! model, never editing the active one.

use crate::{constants::POINT_TOLERANCE_M, error::InvalidPathError};
use nalgebra::Point3;
use noisy_float::types::R64;

pub type Waypoint = Point3<f64>;

/// A location on the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub point: Waypoint,
    /// Arc length from the first waypoint.
    pub arc_length: f64,
    /// Index of the segment containing the point. Segment `i` joins
    /// waypoints `i` and `i + 1`.
    pub segment: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathModel {
    waypoints: Vec<Waypoint>,
    /// `arc_lengths[i]` is the arc length at waypoint `i`.
    arc_lengths: Vec<f64>,
}

impl PathModel {
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, InvalidPathError> {
        if waypoints.len() < 2 {
            return Err(InvalidPathError::TooFewPoints(waypoints.len()));
        }

        if let Some(index) = waypoints
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(InvalidPathError::NonFinite { index });
        }

        let mut arc_lengths = Vec::with_capacity(waypoints.len());
        arc_lengths.push(0.0);

        for (index, pair) in waypoints.windows(2).enumerate() {
            let length = nalgebra::distance(&pair[0], &pair[1]);
            if length <= POINT_TOLERANCE_M {
                return Err(InvalidPathError::CoincidentPoints { index });
            }
            arc_lengths.push(arc_lengths[index] + length);
        }

        Ok(Self {
            waypoints,
            arc_lengths,
        })
    }

    /// Builds a path on the plane `z = height` from separate coordinate arrays.
    pub fn from_xy(xs: &[f64], ys: &[f64], height: f64) -> Result<Self, InvalidPathError> {
        if xs.len() != ys.len() {
            return Err(InvalidPathError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }

        let waypoints = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| Waypoint::new(x, y, height))
            .collect();
        Self::new(waypoints)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false, a path holds at least two waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn total_length(&self) -> f64 {
        *self.arc_lengths.last().unwrap_or(&0.0)
    }

    pub fn start(&self) -> Waypoint {
        self.waypoints[0]
    }

    pub fn end(&self) -> Waypoint {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Finds the point of the path nearest to `position`.
    ///
    /// Every segment is visited, so the cost is linear in the number of
    /// waypoints. On exact ties the point with the smallest arc length wins.
    /// A non-finite `position` yields the start of the path.
    pub fn closest_point(&self, position: &Waypoint) -> PathPoint {
        self.waypoints
            .windows(2)
            .enumerate()
            .filter_map(|(segment, pair)| {
                let (start, end) = (&pair[0], &pair[1]);
                let direction = end - start;
                let seg_length = self.arc_lengths[segment + 1] - self.arc_lengths[segment];
                let ratio =
                    ((position - start).dot(&direction) / direction.norm_squared()).clamp(0.0, 1.0);
                let point = start + direction * ratio;

                let candidate = PathPoint {
                    point,
                    arc_length: self.arc_lengths[segment] + ratio * seg_length,
                    segment,
                };
                R64::try_new(nalgebra::distance_squared(&point, position))
                    .map(|dist| (dist, candidate))
            })
            // min_by_key keeps the first of equal elements
            .min_by_key(|(dist, _)| *dist)
            .map(|(_, candidate)| candidate)
            .unwrap_or(PathPoint {
                point: self.start(),
                arc_length: 0.0,
                segment: 0,
            })
    }

    /// Interpolates the point at arc length `s`, clamped to the path extent.
    pub fn point_at_arc_length(&self, s: f64) -> Waypoint {
        self.path_point_at(s).point
    }

    pub fn path_point_at(&self, s: f64) -> PathPoint {
        let total = self.total_length();
        let s = if s.is_nan() { 0.0 } else { s.clamp(0.0, total) };
        let last_segment = self.waypoints.len() - 2;

        // first waypoint strictly beyond s, minus one
        let segment = self
            .arc_lengths
            .partition_point(|&len| len <= s)
            .saturating_sub(1)
            .min(last_segment);

        let (s0, s1) = (self.arc_lengths[segment], self.arc_lengths[segment + 1]);
        let (start, end) = (&self.waypoints[segment], &self.waypoints[segment + 1]);

        let point = if s >= total {
            *end
        } else {
            start + (end - start) * ((s - s0) / (s1 - s0))
        };

        PathPoint {
            point,
            arc_length: s,
            segment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn approx(a: &Waypoint, b: &Waypoint) -> bool {
        nalgebra::distance(a, b) < 1e-9
    }

    fn l_path() -> PathModel {
        PathModel::new(vec![
            Waypoint::new(0.0, 0.0, 0.5),
            Waypoint::new(10.0, 0.0, 0.5),
            Waypoint::new(10.0, 10.0, 0.5),
        ])
        .unwrap()
    }

    fn random_path(rng: &mut StdRng) -> PathModel {
        let count = rng.gen_range(2..12);
        let mut current = Waypoint::new(0.0, 0.0, 0.0);
        let waypoints = (0..count)
            .map(|_| {
                let step = Waypoint::new(rng.gen_range(0.5..5.0), rng.gen_range(-5.0..5.0), 0.0);
                current += step.coords;
                current
            })
            .collect();
        PathModel::new(waypoints).unwrap()
    }

    #[test]
    fn rejects_short_paths() {
        assert_eq!(
            PathModel::new(vec![Waypoint::origin()]),
            Err(InvalidPathError::TooFewPoints(1))
        );
        assert_eq!(
            PathModel::new(vec![]),
            Err(InvalidPathError::TooFewPoints(0))
        );
    }

    #[test]
    fn rejects_coincident_points() {
        let result = PathModel::new(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(1.0, 0.0, 0.0),
            Waypoint::new(1.0, 0.0, 0.0),
        ]);
        assert_eq!(result, Err(InvalidPathError::CoincidentPoints { index: 1 }));
    }

    #[test]
    fn rejects_non_finite() {
        let result = PathModel::new(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(f64::NAN, 0.0, 0.0),
        ]);
        assert_eq!(result, Err(InvalidPathError::NonFinite { index: 1 }));
    }

    #[test]
    fn from_xy_checks_lengths() {
        assert_eq!(
            PathModel::from_xy(&[0.0, 1.0], &[0.0], 0.5),
            Err(InvalidPathError::LengthMismatch { xs: 2, ys: 1 })
        );
        let path = PathModel::from_xy(&[0.0, 3.0], &[0.0, 4.0], 0.5).unwrap();
        assert_eq!(path.total_length(), 5.0);
        assert_eq!(path.end(), Waypoint::new(3.0, 4.0, 0.5));
    }

    #[test]
    fn arc_length_endpoints() {
        let path = l_path();
        assert_eq!(path.total_length(), 20.0);
        assert!(approx(&path.point_at_arc_length(0.0), &path.start()));
        assert!(approx(&path.point_at_arc_length(20.0), &path.end()));
        assert!(approx(
            &path.point_at_arc_length(15.0),
            &Waypoint::new(10.0, 5.0, 0.5)
        ));
    }

    #[test]
    fn arc_length_is_clamped() {
        let path = l_path();
        assert!(approx(&path.point_at_arc_length(-3.0), &path.start()));
        assert!(approx(&path.point_at_arc_length(100.0), &path.end()));
    }

    #[test]
    fn closest_point_projects_onto_segments() {
        let path = l_path();

        let hit = path.closest_point(&Waypoint::new(4.0, 2.0, 0.5));
        assert!(approx(&hit.point, &Waypoint::new(4.0, 0.0, 0.5)));
        assert_eq!(hit.arc_length, 4.0);
        assert_eq!(hit.segment, 0);

        let hit = path.closest_point(&Waypoint::new(12.0, 7.0, 0.5));
        assert!(approx(&hit.point, &Waypoint::new(10.0, 7.0, 0.5)));
        assert_eq!(hit.arc_length, 17.0);
        assert_eq!(hit.segment, 1);

        let hit = path.closest_point(&Waypoint::new(-5.0, -1.0, 0.5));
        assert!(approx(&hit.point, &path.start()));
        assert_eq!(hit.arc_length, 0.0);
    }

    #[test]
    fn closest_point_prefers_earliest_on_ties() {
        // out and back along the same line
        let path = PathModel::new(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(10.0, 0.0, 0.0),
            Waypoint::new(0.0, 0.0, 0.0),
        ])
        .unwrap();

        let hit = path.closest_point(&Waypoint::new(3.0, 1.0, 0.0));
        assert_eq!(hit.segment, 0);
        assert_eq!(hit.arc_length, 3.0);
    }

    #[test]
    fn closest_point_lies_on_its_segment() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let path = random_path(&mut rng);
            for _ in 0..20 {
                let query = Waypoint::new(
                    rng.gen_range(-10.0..60.0),
                    rng.gen_range(-30.0..30.0),
                    0.0,
                );
                let hit = path.closest_point(&query);
                let wps = path.waypoints();

                // same point as the arc-length lookup
                assert!(approx(&hit.point, &path.point_at_arc_length(hit.arc_length)));

                // arc length inside the range of its segment
                let start = path.closest_point(&wps[hit.segment]).arc_length;
                assert!(hit.arc_length + 1e-9 >= start);
                assert!(
                    hit.arc_length
                        <= start + nalgebra::distance(&wps[hit.segment], &wps[hit.segment + 1])
                            + 1e-9
                );

                // no waypoint is closer
                let dist = nalgebra::distance(&hit.point, &query);
                assert!(wps
                    .iter()
                    .all(|wp| nalgebra::distance(wp, &query) + 1e-9 >= dist));
            }
        }
    }

    #[test]
    fn interpolation_is_continuous() {
        let mut rng = StdRng::seed_from_u64(11);
        let path = random_path(&mut rng);
        let step = path.total_length() / 1000.0;

        let mut prev = path.point_at_arc_length(0.0);
        for i in 1..=1000 {
            let next = path.point_at_arc_length(i as f64 * step);
            assert!(nalgebra::distance(&prev, &next) <= step + 1e-9);
            prev = next;
        }
    }
}
