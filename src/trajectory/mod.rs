//! Piecewise-linear, time-parameterized paths.
//!
//! A [`Trajectory`] is the common currency between the schedule model and the
//! collision engine: events materialize their motion as trajectories, and the
//! sweep queries sample them along concurrent time windows.

mod pairs;

pub use pairs::concurrent_trajectory_pairs;

use nalgebra::Vector3;

/// A single state along a trajectory: a 3D position at a point in time.
///
/// Points are ordered by `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrajectoryPoint {
    pub data: Vector3<f64>,
    pub time: f64,
}

impl TrajectoryPoint {
    pub fn new(data: Vector3<f64>, time: f64) -> Self {
        Self { data, time }
    }

    /// Interpolates from this point toward `other` at `s ∈ [0, 1]`.
    pub fn interp(&self, other: &TrajectoryPoint, s: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            data: self.data + s * (other.data - self.data),
            time: self.time + s * (other.time - self.time),
        }
    }

    /// Euclidean distance between the positions of two points.
    pub fn dist(&self, other: &TrajectoryPoint) -> f64 {
        (self.data - other.data).norm()
    }
}

impl PartialOrd for TrajectoryPoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.time.partial_cmp(&other.time)
    }
}

/// A sequence of [`TrajectoryPoint`]s in non-decreasing time order.
///
/// # Invariants
///
/// - `start_time() <= end_time()` and `elapsed() >= 0`
/// - `distance()` is the polyline length of the positions
/// - sampling is inclusive at both endpoints
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<TrajectoryPoint>) -> Self {
        debug_assert!(
            points.windows(2).all(|w| w[0].time <= w[1].time),
            "trajectory times must be non-decreasing"
        );
        Self { points }
    }

    /// Builds a trajectory from a polyline traversed at constant speed.
    ///
    /// `points[i].time = start_time + (Σ_{j<i} ‖p_{j+1} - p_j‖) / velocity`.
    pub fn from_const_vel_path(
        path: &[Vector3<f64>],
        velocity: f64,
        start_time: f64,
    ) -> Trajectory {
        debug_assert!(velocity > 0.0, "velocity must be positive");
        let mut traj = Trajectory::new();
        let Some(first) = path.first() else {
            return traj;
        };
        traj.push(TrajectoryPoint::new(*first, start_time));
        let mut travelled = 0.0;
        let mut previous = *first;
        for p in &path[1..] {
            travelled += (p - previous).norm();
            traj.push(TrajectoryPoint::new(*p, travelled / velocity + start_time));
            previous = *p;
        }
        traj
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_point(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    pub fn last_point(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    /// Time of the first point, or `0.0` for an empty trajectory.
    pub fn start_time(&self) -> f64 {
        self.points.first().map_or(0.0, |p| p.time)
    }

    /// Time of the last point, or `0.0` for an empty trajectory.
    pub fn end_time(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.time)
    }

    pub fn elapsed(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    /// Total polyline length of the positions.
    pub fn distance(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].dist(&w[1])).sum()
    }

    /// Appends a point. The caller keeps times non-decreasing.
    pub fn push(&mut self, point: TrajectoryPoint) {
        debug_assert!(
            self.points.last().map_or(true, |p| p.time <= point.time),
            "trajectory times must be non-decreasing"
        );
        self.points.push(point);
    }

    pub fn insert(&mut self, index: usize, point: TrajectoryPoint) {
        self.points.insert(index, point);
    }

    /// Samples the trajectory at `time`, interpolating linearly between the
    /// bracketing points. Inclusive at both endpoints; `None` outside
    /// `[start_time, end_time]`.
    pub fn sample(&self, time: f64) -> Option<TrajectoryPoint> {
        if self.points.is_empty() {
            return None;
        }
        if time < self.start_time() || time > self.end_time() {
            return None;
        }

        // First index whose time is >= the query.
        let idx = self.points.partition_point(|p| p.time < time);
        if idx == 0 {
            return Some(self.points[0]);
        }
        let s = self.points[idx];
        let e = self.points[idx - 1];
        if s.time == e.time {
            return Some(s);
        }
        Some(s.interp(&e, (time - s.time) / (e.time - s.time)))
    }

    /// Returns the sub-trajectory over the closed window `[start, end]`.
    ///
    /// The endpoints are the interpolated samples at `start` and `end`;
    /// interior points with strictly-between times are kept verbatim. A
    /// window disjoint from the trajectory yields an empty trajectory, and
    /// `slice(t, t)` yields the single sampled point.
    pub fn slice(&self, start: f64, end: f64) -> Trajectory {
        if self.points.is_empty() {
            return Trajectory::new();
        }
        if start > self.end_time() || end < self.start_time() {
            return Trajectory::new();
        }

        let mut sliced = Trajectory::new();
        if let Some(p) = self.sample(start) {
            sliced.push(p);
        }
        if start == end {
            return sliced;
        }
        for p in &self.points {
            if p.time > start && p.time < end {
                sliced.push(*p);
            }
        }
        if let Some(p) = self.sample(end) {
            sliced.push(p);
        }
        sliced
    }
}

impl std::ops::Add for Trajectory {
    type Output = Trajectory;

    /// Concatenates two trajectories in time order.
    ///
    /// # Panics
    ///
    /// Panics if `self` ends after `rhs` starts (both non-empty). A boundary
    /// point duplicated across the seam (equal time and position) is
    /// collapsed.
    fn add(self, rhs: Trajectory) -> Trajectory {
        if self.points.is_empty() {
            return rhs;
        }
        if rhs.points.is_empty() {
            return self;
        }
        assert!(
            self.end_time() <= rhs.start_time(),
            "trajectories must be concatenated in time order"
        );
        let mut points = self.points;
        let mut tail = rhs.points;
        if let (Some(last), Some(first)) = (points.last(), tail.first()) {
            if last.time == first.time && last.data == first.data {
                tail.remove(0);
            }
        }
        points.extend(tail);
        Trajectory { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{tp, vec3};

    // ── Construction ──────────────────────────────────────────────────

    #[test]
    fn const_vel_path_timing() {
        let path = [vec3(0.0, 0.0, 0.0), vec3(2.0, 0.0, 0.0), vec3(2.0, 2.0, 0.0)];
        let traj = Trajectory::from_const_vel_path(&path, 2.0, 1.0);

        assert_eq!(traj.n_points(), 3);
        assert!((traj.points()[0].time - 1.0).abs() < 1e-12);
        assert!((traj.points()[1].time - 2.0).abs() < 1e-12);
        assert!((traj.points()[2].time - 3.0).abs() < 1e-12);
        assert!((traj.distance() - 4.0).abs() < 1e-12);
        assert!((traj.elapsed() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn const_vel_distance_matches_elapsed_times_velocity() {
        let path = [
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 1.0, 0.0),
            vec3(-1.0, 2.0, 3.0),
            vec3(0.0, 0.0, 0.0),
        ];
        let velocity = 3.5;
        let traj = Trajectory::from_const_vel_path(&path, velocity, 0.0);
        assert!((traj.distance() / velocity - traj.elapsed()).abs() < 1e-9);
    }

    #[test]
    fn empty_trajectory_defaults() {
        let traj = Trajectory::new();
        assert_eq!(traj.start_time(), 0.0);
        assert_eq!(traj.end_time(), 0.0);
        assert_eq!(traj.distance(), 0.0);
        assert!(traj.sample(0.0).is_none());
    }

    // ── Sampling ──────────────────────────────────────────────────────

    #[test]
    fn sample_interpolates_segments() {
        let traj = Trajectory::from_points(vec![
            tp(-1.0, 0.0, 0.0, 0.0),
            tp(0.0, 0.0, 0.0, 1.0),
            tp(1.0, 0.0, 0.0, 2.0),
        ]);

        let mid = traj.sample(0.5).unwrap();
        assert!((mid.data - vec3(-0.5, 0.0, 0.0)).norm() < 1e-12);

        let p = traj.sample(1.5).unwrap();
        assert!((p.data - vec3(0.5, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn sample_is_inclusive_at_both_endpoints() {
        let traj = Trajectory::from_points(vec![tp(0.0, 0.0, 0.0, 1.0), tp(4.0, 0.0, 0.0, 3.0)]);
        assert_eq!(traj.sample(1.0).unwrap(), traj.points()[0]);
        assert_eq!(traj.sample(3.0).unwrap(), traj.points()[1]);
        assert!(traj.sample(0.999).is_none());
        assert!(traj.sample(3.001).is_none());
    }

    #[test]
    fn sample_hits_interior_points_exactly() {
        let traj = Trajectory::from_points(vec![
            tp(0.0, 0.0, 0.0, 0.0),
            tp(1.0, 5.0, 0.0, 1.0),
            tp(2.0, 0.0, 0.0, 2.0),
        ]);
        let p = traj.sample(1.0).unwrap();
        assert_eq!(p, traj.points()[1]);
    }

    // ── Slicing ───────────────────────────────────────────────────────

    #[test]
    fn slice_interpolates_boundaries() {
        let traj = Trajectory::from_points(vec![
            tp(-1.0, 0.0, 0.0, 0.0),
            tp(0.0, 0.0, 0.0, 1.0),
            tp(1.0, 0.0, 0.0, 2.0),
        ]);

        let sliced = traj.slice(0.5, 1.5);
        assert_eq!(sliced.n_points(), 3);
        assert!((sliced.points()[0].data - vec3(-0.5, 0.0, 0.0)).norm() < 1e-12);
        assert!((sliced.points()[0].time - 0.5).abs() < 1e-12);
        assert!((sliced.points()[1].data - vec3(0.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((sliced.points()[1].time - 1.0).abs() < 1e-12);
        assert!((sliced.points()[2].data - vec3(0.5, 0.0, 0.0)).norm() < 1e-12);
        assert!((sliced.points()[2].time - 1.5).abs() < 1e-12);
    }

    #[test]
    fn slice_disjoint_window_is_empty() {
        let traj = Trajectory::from_points(vec![tp(0.0, 0.0, 0.0, 0.0), tp(1.0, 0.0, 0.0, 1.0)]);
        assert!(traj.slice(2.0, 3.0).is_empty());
        assert!(traj.slice(-2.0, -1.0).is_empty());
    }

    #[test]
    fn slice_at_instant_is_single_sample() {
        let traj = Trajectory::from_points(vec![tp(0.0, 0.0, 0.0, 0.0), tp(2.0, 0.0, 0.0, 2.0)]);
        let instant = traj.slice(1.0, 1.0);
        assert_eq!(instant.n_points(), 1);
        assert_eq!(instant.sample(1.0), traj.sample(1.0));
    }

    #[test]
    fn slice_window_covering_whole_trajectory() {
        let traj = Trajectory::from_points(vec![tp(0.0, 0.0, 0.0, 1.0), tp(1.0, 0.0, 0.0, 2.0)]);
        let sliced = traj.slice(0.0, 3.0);
        assert_eq!(sliced, traj);
    }

    #[test]
    fn slice_split_equals_whole() {
        // slice(t0, t2) == slice(t0, t1) + slice(t1, t2) up to the seam point
        let traj = Trajectory::from_points(vec![
            tp(0.0, 0.0, 0.0, 0.0),
            tp(1.0, 2.0, 0.0, 1.0),
            tp(3.0, 2.0, 1.0, 2.5),
            tp(4.0, 0.0, 1.0, 4.0),
        ]);
        let (t0, t1, t2) = (0.5, 1.7, 3.2);
        let whole = traj.slice(t0, t2);
        let joined = traj.slice(t0, t1) + traj.slice(t1, t2);
        assert_eq!(whole, joined);
    }

    // ── Concatenation ─────────────────────────────────────────────────

    #[test]
    fn add_collapses_duplicate_boundary() {
        let a = Trajectory::from_points(vec![tp(0.0, 0.0, 0.0, 0.0), tp(1.0, 0.0, 0.0, 1.0)]);
        let b = Trajectory::from_points(vec![tp(1.0, 0.0, 0.0, 1.0), tp(2.0, 0.0, 0.0, 2.0)]);
        let joined = a + b;
        assert_eq!(joined.n_points(), 3);
        assert!((joined.distance() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn add_keeps_discontinuity_points() {
        let a = Trajectory::from_points(vec![tp(0.0, 0.0, 0.0, 0.0), tp(1.0, 0.0, 0.0, 1.0)]);
        let b = Trajectory::from_points(vec![tp(5.0, 0.0, 0.0, 1.0), tp(6.0, 0.0, 0.0, 2.0)]);
        let joined = a + b;
        assert_eq!(joined.n_points(), 4);
    }

    #[test]
    #[should_panic(expected = "time order")]
    fn add_rejects_overlapping_times() {
        let a = Trajectory::from_points(vec![tp(0.0, 0.0, 0.0, 0.0), tp(1.0, 0.0, 0.0, 2.0)]);
        let b = Trajectory::from_points(vec![tp(1.0, 0.0, 0.0, 1.0), tp(2.0, 0.0, 0.0, 3.0)]);
        let _ = a + b;
    }

    #[test]
    fn add_with_empty_is_identity() {
        let a = Trajectory::from_points(vec![tp(0.0, 0.0, 0.0, 0.0), tp(1.0, 0.0, 0.0, 1.0)]);
        assert_eq!(a.clone() + Trajectory::new(), a);
        assert_eq!(Trajectory::new() + a.clone(), a);
    }

    // ── Randomized slice/sample agreement ─────────────────────────────

    #[test]
    fn slice_instant_sample_agrees_with_direct_sample() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let n = rng.gen_range(2..8);
            let mut time = 0.0;
            let mut points = Vec::new();
            for _ in 0..n {
                points.push(tp(
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(0.0..2.0),
                    time,
                ));
                time += rng.gen_range(0.1..2.0);
            }
            let traj = Trajectory::from_points(points);
            let t = rng.gen_range(traj.start_time()..traj.end_time());

            let direct = traj.sample(t).unwrap();
            let via_slice = traj.slice(t, t).sample(t).unwrap();
            assert!((direct.data - via_slice.data).norm() < 1e-9);
            assert!((direct.time - via_slice.time).abs() < 1e-9);
        }
    }
}
