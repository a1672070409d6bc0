//! Materializing schedules as trajectories and testing candidate events
//! against the committed multi-agent schedule.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::collision::{trajectory_collision_query, CollisionError};
use crate::scheduling::{Event, Interval, MultiAgentToolpathSchedule, ToolpathSchedule};
use crate::trajectory::{concurrent_trajectory_pairs, Trajectory, TrajectoryPoint};
use crate::AgentId;

use super::agent::AgentModel;

/// Slices a schedule into the per-event trajectory portions lying inside
/// `[t_start, t_end]`.
///
/// Each overlapping event contributes exactly the part of its trajectory
/// inside the window, selected by the Allen relation between the event and
/// the window; gaps between events are preserved as gaps (callers pair up
/// concurrent overlaps only).
pub fn schedule_to_trajectories(
    schedule: &ToolpathSchedule,
    t_start: f64,
    t_end: f64,
) -> Vec<Trajectory> {
    let window = Interval::from_f64(t_start, t_end);
    let mut trajs = Vec::new();

    for event in schedule.events() {
        let iv = event.interval();
        if iv.precedes(&window) {
            continue;
        }
        if iv.preceded_by(&window) {
            break;
        }

        let traj = event.trajectory();
        let piece = if iv.meets(&window) {
            Trajectory::from_points(vec![*traj
                .last_point()
                .expect("event trajectories are non-empty")])
        } else if iv.overlaps(&window) {
            traj.slice(t_start, event.end())
        } else if iv.starts(&window)
            || iv.during(&window)
            || iv.finishes(&window)
            || iv.equals(&window)
        {
            traj.clone()
        } else if iv.finished_by(&window) || iv.contains(&window) || iv.started_by(&window) {
            traj.slice(t_start, t_end)
        } else if iv.overlapped_by(&window) {
            traj.slice(event.start(), t_end)
        } else if iv.met_by(&window) {
            Trajectory::from_points(vec![*traj
                .first_point()
                .expect("event trajectories are non-empty")])
        } else {
            unreachable!("the thirteen Allen relations are exhaustive")
        };
        trajs.push(piece);
    }
    trajs
}

/// Slices a schedule into one continuous trajectory over `[t_start, t_end]`.
///
/// Gaps between events are bridged by the schedule state, and the result is
/// guaranteed to have points at both window boundaries (using
/// `default_state` where the schedule has no known state yet).
pub fn schedule_to_trajectory(
    schedule: &ToolpathSchedule,
    t_start: f64,
    t_end: f64,
    default_state: Vector3<f64>,
) -> Trajectory {
    let mut points: Vec<TrajectoryPoint> = Vec::new();

    for event in schedule.events() {
        if event.end() < t_start {
            continue;
        }
        if event.start() >= t_end {
            break;
        }
        let piece = event
            .trajectory()
            .slice(event.start().max(t_start), event.end().min(t_end));
        let mut piece_points = piece.points().to_vec();

        // collapse the seam between contiguous events
        if let (Some(last), Some(first)) = (points.last(), piece_points.first()) {
            if last.time == first.time {
                piece_points.remove(0);
            }
        }
        points.extend(piece_points);
    }

    let needs_front = points.first().map_or(true, |p| p.time > t_start);
    let needs_back = points.last().map_or(true, |p| p.time < t_end);
    if needs_front {
        let state = schedule.get_state(t_start, default_state);
        points.insert(0, TrajectoryPoint::new(state, t_start));
    }
    if needs_back {
        let state = schedule.get_state(t_end, default_state);
        points.push(TrajectoryPoint::new(state, t_end));
    }
    Trajectory::from_points(points)
}

/// Determines whether committing `events` for `agent` would put it in
/// collision with any other agent in `schedule`.
///
/// The candidate events are materialized over `[min(starts), max(ends)]`
/// and swept pairwise against every other agent's concurrent motion. An
/// agent with no motion in the window is represented by a stationary
/// trajectory at its schedule state (its home before it has moved at all).
pub fn events_cause_collision(
    events: &[Event],
    agent: &str,
    schedule: &MultiAgentToolpathSchedule,
    models: &HashMap<AgentId, AgentModel>,
    threshold: f64,
) -> Result<bool, CollisionError> {
    let Some(t_start) = events.iter().map(Event::start).reduce(f64::min) else {
        return Ok(false);
    };
    let t_end = events
        .iter()
        .map(Event::end)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut candidate = ToolpathSchedule::new();
    for event in events {
        candidate.add_event(event.clone());
    }
    let candidate_trajs = schedule_to_trajectories(&candidate, t_start, t_end);

    for other in schedule.agents() {
        if other.as_str() == agent {
            continue;
        }
        let other_schedule = schedule.get(other).expect("listed agents have schedules");
        let mut other_trajs = schedule_to_trajectories(other_schedule, t_start, t_end);
        if other_trajs.is_empty() {
            // parked for the whole window
            let parked = other_schedule.get_state(t_start, models[other].home);
            other_trajs.push(Trajectory::from_points(vec![
                TrajectoryPoint::new(parked, t_start),
                TrajectoryPoint::new(parked, t_end),
            ]));
        }

        let mut shape = models[agent].collision_shape;
        let mut other_shape = models[other].collision_shape;
        for (traj, other_traj) in concurrent_trajectory_pairs(&candidate_trajs, &other_trajs) {
            if trajectory_collision_query(
                &mut shape,
                &traj,
                &mut other_shape,
                &other_traj,
                threshold,
            )? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionShape;
    use crate::scheduling::{ContourEvent, MoveEvent};
    use crate::test_utils::{tp, vec3};
    use crate::toolpath::Contour;

    fn move_event(start: f64, path: Vec<Vector3<f64>>) -> Event {
        Event::Move(MoveEvent::new(start, path, 1.0))
    }

    // ── schedule_to_trajectories ──────────────────────────────────────

    #[test]
    fn trajectories_cover_whole_events_in_window() {
        let mut schedule = ToolpathSchedule::new();
        let e1 = move_event(0.0, vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0)]);
        let e2 = move_event(3.0, vec![vec3(2.0, 0.0, 0.0), vec3(3.0, 0.0, 0.0)]);
        schedule.add_event(e1.clone());
        schedule.add_event(e2.clone());

        let trajs = schedule_to_trajectories(&schedule, schedule.start_time(), schedule.end_time());
        assert_eq!(trajs.len(), 2);
        assert_eq!(trajs[0].start_time(), e1.start());
        assert_eq!(trajs[0].end_time(), e1.end());
        assert_eq!(trajs[1].start_time(), e2.start());
        assert_eq!(trajs[1].end_time(), e2.end());
    }

    #[test]
    fn trajectories_are_sliced_to_the_window() {
        let mut schedule = ToolpathSchedule::new();
        schedule.add_event(move_event(0.0, vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0)]));
        schedule.add_event(move_event(3.0, vec![vec3(2.0, 0.0, 0.0), vec3(3.0, 0.0, 0.0)]));

        let trajs = schedule_to_trajectories(&schedule, 0.5, 3.5);
        assert_eq!(trajs.len(), 2);

        let expected1 = Trajectory::from_points(vec![
            tp(0.5, 0.0, 0.0, 0.5),
            tp(1.0, 0.0, 0.0, 1.0),
        ]);
        let expected2 = Trajectory::from_points(vec![
            tp(2.0, 0.0, 0.0, 3.0),
            tp(2.5, 0.0, 0.0, 3.5),
        ]);
        assert_eq!(trajs[0], expected1);
        assert_eq!(trajs[1], expected2);
    }

    #[test]
    fn trajectories_of_disjoint_window_are_empty() {
        let mut schedule = ToolpathSchedule::new();
        schedule.add_event(move_event(0.0, vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0)]));
        let trajs = schedule_to_trajectories(&schedule, 6.0, 7.0);
        assert!(trajs.is_empty());
    }

    #[test]
    fn touching_events_contribute_single_points() {
        let mut schedule = ToolpathSchedule::new();
        schedule.add_event(move_event(0.0, vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0)]));

        // event ends exactly at the window start
        let trajs = schedule_to_trajectories(&schedule, 1.0, 2.0);
        assert_eq!(trajs.len(), 1);
        assert_eq!(trajs[0].n_points(), 1);
        assert_eq!(trajs[0].start_time(), 1.0);

        // event starts exactly at the window end
        let trajs = schedule_to_trajectories(&schedule, -2.0, 0.0);
        assert_eq!(trajs.len(), 1);
        assert_eq!(trajs[0].n_points(), 1);
        assert_eq!(trajs[0].points()[0].data, vec3(0.0, 0.0, 0.0));
    }

    // ── schedule_to_trajectory ────────────────────────────────────────

    #[test]
    fn continuous_trajectory_bridges_gaps() {
        let c1 = Contour::new(vec![vec3(0.0, 1.0, 0.0), vec3(0.0, 0.0, 0.0)], 0);
        let c2 = Contour::new(vec![vec3(1.0, 0.0, 0.0), vec3(2.0, 0.0, 0.0)], 0);
        let mut schedule = ToolpathSchedule::new();
        schedule.add_event(Event::Contour(ContourEvent::new(1.0, c1, 1.0)));
        schedule.add_event(Event::Contour(ContourEvent::new(5.0, c2.clone(), 1.0)));

        let default = vec3(-9.0, -9.0, -9.0);

        // window before everything: default at the front
        let traj = schedule_to_trajectory(&schedule, 0.0, 1.5, default);
        assert_eq!(traj.start_time(), 0.0);
        assert_eq!(traj.points()[0].data, default);
        assert_eq!(traj.end_time(), 1.5);

        // window in the gap: held at the last terminal position
        let traj = schedule_to_trajectory(&schedule, 2.5, 4.5, default);
        assert_eq!(traj.n_points(), 2);
        assert_eq!(traj.points()[0].data, vec3(0.0, 0.0, 0.0));
        assert_eq!(traj.points()[1].data, vec3(0.0, 0.0, 0.0));

        // window spanning the second event: ends padded to the window
        let traj = schedule_to_trajectory(&schedule, 4.0, 7.0, default);
        assert_eq!(traj.start_time(), 4.0);
        assert_eq!(traj.end_time(), 7.0);
        assert_eq!(traj.points()[0].data, vec3(0.0, 0.0, 0.0));
        assert_eq!(traj.last_point().unwrap().data, vec3(2.0, 0.0, 0.0));
    }

    #[test]
    fn continuous_trajectory_of_empty_schedule_is_the_default() {
        let schedule = ToolpathSchedule::new();
        let default = vec3(1.0, 2.0, 3.0);
        let traj = schedule_to_trajectory(&schedule, 0.0, 4.0, default);
        assert_eq!(traj.n_points(), 2);
        assert_eq!(traj.points()[0].data, default);
        assert_eq!(traj.points()[1].data, default);
    }

    // ── events_cause_collision ────────────────────────────────────────

    fn facing_models() -> HashMap<AgentId, AgentModel> {
        let dims = vec3(3.0, 0.2, 1.0);
        let mut models = HashMap::new();
        models.insert(
            "agent1".to_string(),
            AgentModel::new(
                [0],
                CollisionShape::anchored_box_arm(dims, vec3(-5.0, 0.0, 0.0), Vector3::zeros()),
                vec3(-5.0, 0.0, 0.0),
                vec3(-3.0, 0.0, 0.0),
                1.0,
                1.0,
            ),
        );
        models.insert(
            "agent2".to_string(),
            AgentModel::new(
                [0],
                CollisionShape::anchored_box_arm(dims, vec3(5.0, 0.0, 0.0), Vector3::zeros()),
                vec3(5.0, 0.0, 0.0),
                vec3(3.0, 0.0, 0.0),
                1.0,
                1.0,
            ),
        );
        models
    }

    fn contour_event(start: f64, path: Vec<Vector3<f64>>) -> Event {
        Event::Contour(ContourEvent::new(start, Contour::new(path, 0), 1.0))
    }

    #[test]
    fn concurrent_crossing_contours_collide() {
        let models = facing_models();
        let threshold = 0.05;
        let mut schedule = MultiAgentToolpathSchedule::new();
        schedule.add_agent("agent1");
        schedule.add_agent("agent2");

        let e1 = contour_event(0.0, vec![vec3(0.0, 2.0, 0.0), vec3(0.0, -2.0, 0.0)]);
        assert!(!events_cause_collision(
            &[e1.clone()],
            "agent1",
            &schedule,
            &models,
            threshold
        )
        .unwrap());
        schedule.add_event(e1, "agent1");

        // crossing the first agent's active contour
        let e2 = contour_event(0.0, vec![vec3(2.0, 0.0, 0.0), vec3(-2.0, 0.0, 0.0)]);
        assert!(events_cause_collision(&[e2], "agent2", &schedule, &models, threshold).unwrap());

        // same motion, after the first agent has cleared
        let e3 = contour_event(6.0, vec![vec3(2.0, 0.0, 0.0), vec3(-2.0, 0.0, 0.0)]);
        assert!(
            !events_cause_collision(&[e3.clone()], "agent2", &schedule, &models, threshold)
                .unwrap()
        );
        schedule.add_event(e3, "agent2");

        // reaching toward the first agent's parked tip collides again
        let e4 = contour_event(12.0, vec![vec3(-2.0, 0.0, 0.0), vec3(0.0, -2.0, 0.0)]);
        assert!(events_cause_collision(&[e4], "agent2", &schedule, &models, threshold).unwrap());
    }

    #[test]
    fn agents_without_events_block_as_parked_obstacles() {
        let models = facing_models();
        let mut schedule = MultiAgentToolpathSchedule::new();
        schedule.add_agent("agent1");
        schedule.add_agent("agent2");

        // agent2 never scheduled anything: it is parked at home (3, 0, 0).
        // agent1 sweeping into that parking spot must collide.
        let sweep = contour_event(0.0, vec![vec3(0.0, 0.0, 0.0), vec3(3.5, 0.0, 0.0)]);
        assert!(events_cause_collision(&[sweep], "agent1", &schedule, &models, 0.05).unwrap());
    }
}
