//! Continuous collision queries over trajectories.
//!
//! Two algorithms are exposed: a pairwise interval-based sweep
//! ([`trajectory_collision_query`]) used by the planner, and a discrete
//! time-stepped group check ([`check_trajectory_collision`]) for whole
//! trajectory sets. Both restore shape poses before returning.

use log::trace;
use nalgebra::Vector3;

use super::error::CollisionError;
use super::shapes::{CollisionGroup, CollisionShape};
use crate::trajectory::Trajectory;

/// Sweeps two shapes along straight lines from their current translations to
/// the given endpoints, testing for collision every `threshold` units of the
/// longer displacement.
///
/// At least the two endpoints are always tested, so a stationary overlapping
/// pair is still reported. Both poses are restored before returning.
pub fn continuous_collide(
    shape1: &mut CollisionShape,
    trans1_final: Vector3<f64>,
    shape2: &mut CollisionShape,
    trans2_final: Vector3<f64>,
    threshold: f64,
) -> Result<bool, CollisionError> {
    let saved1 = *shape1;
    let saved2 = *shape2;

    let start1 = shape1.translation();
    let start2 = shape2.translation();
    let dir1 = trans1_final - start1;
    let dir2 = trans2_final - start2;

    let n = ((dir1.norm().max(dir2.norm()) / threshold).ceil() as usize).max(2);

    let result = (|| {
        for i in 0..n {
            let s = i as f64 / (n - 1) as f64;
            shape1.set_translation(start1 + dir1 * s)?;
            shape2.set_translation(start2 + dir2 * s)?;
            if shape1.in_collision(shape2)? {
                return Ok(true);
            }
        }
        Ok(false)
    })();

    *shape1 = saved1;
    *shape2 = saved2;
    result
}

/// Determines whether two shapes collide anywhere along their trajectories.
///
/// The trajectories are cut at the union of their point times; within each
/// cut both motions are linear, so each window reduces to a
/// [`continuous_collide`] sweep. Poses are restored before returning.
pub fn trajectory_collision_query(
    shape1: &mut CollisionShape,
    traj1: &Trajectory,
    shape2: &mut CollisionShape,
    traj2: &Trajectory,
    threshold: f64,
) -> Result<bool, CollisionError> {
    let saved1 = *shape1;
    let saved2 = *shape2;

    let result = (|| {
        let mut times: Vec<f64> = traj1
            .points()
            .iter()
            .chain(traj2.points())
            .map(|p| p.time)
            .collect();
        times.sort_by(f64::total_cmp);
        times.dedup();

        for window in times.windows(2) {
            let slice1 = traj1.slice(window[0], window[1]);
            let slice2 = traj2.slice(window[0], window[1]);
            let (Some(first1), Some(first2)) = (slice1.first_point(), slice2.first_point()) else {
                continue;
            };
            shape1.set_translation(first1.data)?;
            shape2.set_translation(first2.data)?;

            let final1 = slice1.last_point().expect("slice is non-empty").data;
            let final2 = slice2.last_point().expect("slice is non-empty").data;
            if continuous_collide(shape1, final1, shape2, final2, threshold)? {
                trace!(
                    "trajectory collision in window [{:.4}, {:.4}]",
                    window[0],
                    window[1]
                );
                return Ok(true);
            }
        }
        Ok(false)
    })();

    *shape1 = saved1;
    *shape2 = saved2;
    result
}

/// Steps a trajectory state forward in fixed time increments.
///
/// Before the trajectory begins the interpolator reports the first point;
/// after it completes it reports (and keeps reporting) the last point.
#[derive(Debug)]
pub struct TrajectoryStateInterpolator<'a> {
    traj: &'a Trajectory,
    delta_t: f64,
    time: f64,
    segment_idx: usize,
    complete: bool,
}

impl<'a> TrajectoryStateInterpolator<'a> {
    /// `traj` must have at least one point.
    pub fn new(traj: &'a Trajectory, delta_t: f64, start_time: f64) -> Self {
        debug_assert!(!traj.is_empty(), "cannot interpolate an empty trajectory");
        Self {
            traj,
            delta_t,
            time: start_time,
            segment_idx: 1,
            complete: traj.n_points() < 2,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Advances time by one step and returns the interpolated state.
    pub fn step_state(&mut self) -> Vector3<f64> {
        let points = self.traj.points();
        if self.complete {
            return points[points.len() - 1].data;
        }

        self.time += self.delta_t;

        // before the first point: hold the start state
        if points[self.segment_idx - 1].time > self.time {
            return points[self.segment_idx - 1].data;
        }

        // advance past finished segments
        while points[self.segment_idx].time <= self.time {
            self.segment_idx += 1;
            if self.segment_idx >= points.len() {
                self.complete = true;
                return points[points.len() - 1].data;
            }
        }

        let start = &points[self.segment_idx - 1];
        let end = &points[self.segment_idx];
        let s = (self.time - start.time) / (end.time - start.time);
        start.interp(end, s).data
    }
}

/// Discrete-step collision check of a whole trajectory set.
///
/// The time step is chosen so that the fastest trajectory advances at most
/// `threshold` units per step; every shape in the group is stepped in
/// lockstep and the group is tested pairwise at each instant. Group poses
/// are restored before returning.
///
/// # Errors
///
/// [`CollisionError::DegenerateTrajectory`] when no trajectory has both
/// positive length and positive duration, leaving the step size undefined.
pub fn check_trajectory_collision(
    group: &mut CollisionGroup,
    trajectories: &[Trajectory],
    threshold: f64,
) -> Result<bool, CollisionError> {
    debug_assert_eq!(group.len(), trajectories.len());

    let start_time = trajectories
        .iter()
        .map(Trajectory::start_time)
        .fold(f64::INFINITY, f64::min);

    // the fastest trajectory defines the step guaranteeing `threshold`
    let fastest = trajectories
        .iter()
        .filter(|t| t.distance() > 0.0 && t.elapsed() > 0.0)
        .max_by(|a, b| {
            (a.distance() / a.elapsed()).total_cmp(&(b.distance() / b.elapsed()))
        })
        .ok_or(CollisionError::DegenerateTrajectory)?;
    let delta_t = fastest.elapsed() * threshold / fastest.distance();

    let saved: Vec<CollisionShape> = group.shapes().to_vec();

    let mut interpolators: Vec<TrajectoryStateInterpolator> = trajectories
        .iter()
        .map(|t| TrajectoryStateInterpolator::new(t, delta_t, start_time))
        .collect();

    let result = (|| {
        let mut completed = false;
        while !completed {
            completed = true;
            for (idx, interp) in interpolators.iter_mut().enumerate() {
                completed = interp.is_complete() && completed;
                let state = interp.step_state();
                group.shape_mut(idx).set_translation(state)?;
            }
            if group.in_collision()? {
                return Ok(true);
            }
        }
        Ok(false)
    })();

    for (idx, shape) in saved.into_iter().enumerate() {
        *group.shape_mut(idx) = shape;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{tp, vec3};
    use crate::trajectory::Trajectory;

    fn box_at(p: Vector3<f64>) -> CollisionShape {
        let mut shape = CollisionShape::oriented_box(1.0, 1.0, 1.0);
        shape.set_translation(p).unwrap();
        shape
    }

    // ── continuous_collide ────────────────────────────────────────────

    #[test]
    fn sweep_detects_crossing_paths() {
        let mut a = box_at(vec3(-5.0, 0.0, 0.0));
        let mut b = box_at(vec3(5.0, 0.0, 0.0));
        // both sweep through the origin
        let hit = continuous_collide(&mut a, vec3(5.0, 0.0, 0.0), &mut b, vec3(-5.0, 0.0, 0.0), 0.1)
            .unwrap();
        assert!(hit);
    }

    #[test]
    fn sweep_misses_parallel_paths() {
        let mut a = box_at(vec3(-5.0, 0.0, 0.0));
        let mut b = box_at(vec3(-5.0, 5.0, 0.0));
        let hit = continuous_collide(&mut a, vec3(5.0, 0.0, 0.0), &mut b, vec3(5.0, 5.0, 0.0), 0.1)
            .unwrap();
        assert!(!hit);
    }

    #[test]
    fn sweep_restores_poses() {
        let mut a = box_at(vec3(-5.0, 0.0, 0.0));
        let mut b = box_at(vec3(5.0, 0.0, 0.0));
        continuous_collide(&mut a, vec3(5.0, 0.0, 0.0), &mut b, vec3(-5.0, 0.0, 0.0), 0.1).unwrap();
        assert_eq!(a.translation(), vec3(-5.0, 0.0, 0.0));
        assert_eq!(b.translation(), vec3(5.0, 0.0, 0.0));
    }

    #[test]
    fn stationary_overlapping_shapes_are_detected() {
        let mut a = box_at(vec3(0.0, 0.0, 0.0));
        let mut b = box_at(vec3(0.25, 0.0, 0.0));
        let hit = continuous_collide(
            &mut a,
            vec3(0.0, 0.0, 0.0),
            &mut b,
            vec3(0.25, 0.0, 0.0),
            0.1,
        )
        .unwrap();
        assert!(hit);
    }

    // ── trajectory_collision_query ────────────────────────────────────

    #[test]
    fn query_detects_concurrent_crossing() {
        let mut a = box_at(vec3(-5.0, 0.0, 0.0));
        let mut b = box_at(vec3(5.0, 0.0, 0.0));
        let t1 = Trajectory::from_points(vec![tp(-5.0, 0.0, 0.0, 0.0), tp(5.0, 0.0, 0.0, 10.0)]);
        let t2 = Trajectory::from_points(vec![tp(5.0, 0.0, 0.0, 0.0), tp(-5.0, 0.0, 0.0, 10.0)]);
        assert!(trajectory_collision_query(&mut a, &t1, &mut b, &t2, 0.05).unwrap());
    }

    #[test]
    fn query_clears_time_separated_visits() {
        // both visit the origin, but at different times
        let mut a = box_at(vec3(-5.0, 0.0, 0.0));
        let mut b = box_at(vec3(5.0, 0.0, 0.0));
        let t1 = Trajectory::from_points(vec![
            tp(-5.0, 0.0, 0.0, 0.0),
            tp(0.0, 0.0, 0.0, 1.0),
            tp(-5.0, 0.0, 0.0, 2.0),
        ]);
        let t2 = Trajectory::from_points(vec![
            tp(5.0, 0.0, 0.0, 0.0),
            tp(5.0, 0.0, 0.0, 4.0),
            tp(0.0, 0.0, 0.0, 5.0),
        ]);
        assert!(!trajectory_collision_query(&mut a, &t1, &mut b, &t2, 0.05).unwrap());
    }

    #[test]
    fn query_restores_poses() {
        let mut a = box_at(vec3(-5.0, 0.0, 0.0));
        let mut b = box_at(vec3(5.0, 0.0, 0.0));
        let t1 = Trajectory::from_points(vec![tp(-5.0, 0.0, 0.0, 0.0), tp(5.0, 0.0, 0.0, 10.0)]);
        let t2 = Trajectory::from_points(vec![tp(5.0, 0.0, 0.0, 0.0), tp(-5.0, 0.0, 0.0, 10.0)]);
        trajectory_collision_query(&mut a, &t1, &mut b, &t2, 0.05).unwrap();
        assert_eq!(a.translation(), vec3(-5.0, 0.0, 0.0));
        assert_eq!(b.translation(), vec3(5.0, 0.0, 0.0));
    }

    #[test]
    fn query_threshold_monotonicity() {
        // a collision found at threshold h is also found at h/2
        let mut a = box_at(vec3(-5.0, 0.0, 0.0));
        let mut b = box_at(vec3(5.0, 0.0, 0.0));
        let t1 = Trajectory::from_points(vec![tp(-5.0, 0.0, 0.0, 0.0), tp(5.0, 0.0, 0.0, 1.0)]);
        let t2 = Trajectory::from_points(vec![tp(5.0, 0.0, 0.0, 0.0), tp(-5.0, 0.0, 0.0, 1.0)]);

        let mut h = 1.0;
        let mut detected_before = false;
        while h > 1e-3 {
            let hit = trajectory_collision_query(&mut a, &t1, &mut b, &t2, h).unwrap();
            assert!(
                !detected_before || hit,
                "collision detected at a coarser threshold was lost at {h}"
            );
            detected_before = detected_before || hit;
            h /= 2.0;
        }
        assert!(detected_before);
    }

    // ── TrajectoryStateInterpolator ───────────────────────────────────

    #[test]
    fn interpolator_walks_the_trajectory() {
        let traj = Trajectory::from_points(vec![tp(0.0, 0.0, 0.0, 0.0), tp(4.0, 0.0, 0.0, 4.0)]);
        let mut interp = TrajectoryStateInterpolator::new(&traj, 1.0, 0.0);

        assert!((interp.step_state() - vec3(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((interp.step_state() - vec3(2.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((interp.step_state() - vec3(3.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((interp.step_state() - vec3(4.0, 0.0, 0.0)).norm() < 1e-12);
        // past the end: holds the final state
        assert!((interp.step_state() - vec3(4.0, 0.0, 0.0)).norm() < 1e-12);
        assert!(interp.is_complete());
    }

    #[test]
    fn interpolator_holds_start_until_trajectory_begins() {
        let traj = Trajectory::from_points(vec![tp(1.0, 0.0, 0.0, 5.0), tp(2.0, 0.0, 0.0, 6.0)]);
        let mut interp = TrajectoryStateInterpolator::new(&traj, 1.0, 0.0);
        // steps at t=1..=4 stay at the start state
        for _ in 0..4 {
            assert!((interp.step_state() - vec3(1.0, 0.0, 0.0)).norm() < 1e-12);
        }
    }

    // ── check_trajectory_collision ────────────────────────────────────

    #[test]
    fn group_check_detects_crossing() {
        let mut group = CollisionGroup::new(vec![
            box_at(vec3(-5.0, 0.0, 0.0)),
            box_at(vec3(5.0, 0.0, 0.0)),
        ]);
        let trajs = vec![
            Trajectory::from_points(vec![tp(-5.0, 0.0, 0.0, 0.0), tp(5.0, 0.0, 0.0, 10.0)]),
            Trajectory::from_points(vec![tp(5.0, 0.0, 0.0, 0.0), tp(-5.0, 0.0, 0.0, 10.0)]),
        ];
        assert!(check_trajectory_collision(&mut group, &trajs, 0.1).unwrap());
    }

    #[test]
    fn group_check_clears_separated_motion() {
        let mut group = CollisionGroup::new(vec![
            box_at(vec3(-5.0, 0.0, 0.0)),
            box_at(vec3(-5.0, 5.0, 0.0)),
        ]);
        let trajs = vec![
            Trajectory::from_points(vec![tp(-5.0, 0.0, 0.0, 0.0), tp(5.0, 0.0, 0.0, 10.0)]),
            Trajectory::from_points(vec![tp(-5.0, 5.0, 0.0, 0.0), tp(5.0, 5.0, 0.0, 10.0)]),
        ];
        assert!(!check_trajectory_collision(&mut group, &trajs, 0.1).unwrap());
    }

    #[test]
    fn group_check_rejects_degenerate_trajectories() {
        let mut group = CollisionGroup::new(vec![
            box_at(vec3(-5.0, 0.0, 0.0)),
            box_at(vec3(5.0, 0.0, 0.0)),
        ]);
        let trajs = vec![
            Trajectory::from_points(vec![tp(-5.0, 0.0, 0.0, 0.0)]),
            Trajectory::from_points(vec![tp(5.0, 0.0, 0.0, 0.0)]),
        ];
        let result = check_trajectory_collision(&mut group, &trajs, 0.1);
        assert_eq!(result, Err(CollisionError::DegenerateTrajectory));
    }
}
