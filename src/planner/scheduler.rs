//! The greedy time-stepped multi-agent planner.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, trace};
use nalgebra::Vector3;

use crate::scheduling::{ContourEvent, DependencyGraph, Event, MoveEvent, MultiAgentToolpathSchedule};
use crate::toolpath::{Contour, Toolpath};
use crate::AgentId;

use super::agent::AgentModel;
use super::errors::PlanningError;
use super::options::PlanningOptions;
use super::toolpath_collision::events_cause_collision;

/// Plans conflict-free, precedence-respecting motion schedules for a team of
/// heterogeneous agents.
///
/// The planner advances a per-agent clock in lockstep with the committed
/// schedule. At every decision point the agents whose clocks sit at the
/// current time pick the ready task unlocking the most successors, commit an
/// atomic four-event chain (travel, contour, retract, return home) if it is
/// collision-free against everything already committed, and otherwise retry
/// later. The result is deterministic for fixed inputs: agents are visited
/// in insertion order, candidates in (out-degree desc, index asc) order.
///
/// The algorithm is a greedy LPT-style heuristic: complete and terminating,
/// not optimal.
pub struct MultiAgentToolpathPlanner {
    order: Vec<AgentId>,
    models: HashMap<AgentId, AgentModel>,
}

impl MultiAgentToolpathPlanner {
    /// Creates a planner over the given agents. Agent iteration order (and
    /// therefore tie-breaking among equally ready agents) follows the input
    /// order.
    pub fn new(agents: Vec<(AgentId, AgentModel)>) -> Self {
        let mut order = Vec::with_capacity(agents.len());
        let mut models = HashMap::with_capacity(agents.len());
        for (id, model) in agents {
            if !models.contains_key(&id) {
                order.push(id.clone());
            }
            models.insert(id, model);
        }
        Self { order, models }
    }

    pub fn agents(&self) -> impl Iterator<Item = &AgentId> {
        self.order.iter()
    }

    pub fn model(&self, agent: &str) -> Option<&AgentModel> {
        self.models.get(agent)
    }

    /// Plans the toolpath from time zero.
    ///
    /// # Errors
    ///
    /// - [`PlanningError::UncoverableCapability`] if some contour's tool is
    ///   in no agent's capability set
    /// - [`PlanningError::UnknownTask`] if the dependency graph references a
    ///   contour index outside the toolpath
    /// - [`PlanningError::Collision`] if the collision engine fails
    pub fn plan(
        &self,
        toolpath: &Toolpath,
        dg: &mut DependencyGraph<usize>,
        options: &PlanningOptions,
    ) -> Result<MultiAgentToolpathSchedule, PlanningError> {
        self.plan_from(toolpath, dg, options, 0.0)
    }

    /// Plans the toolpath with every agent's clock starting at `start_time`
    /// and every agent at its home position.
    pub fn plan_from(
        &self,
        toolpath: &Toolpath,
        dg: &mut DependencyGraph<usize>,
        options: &PlanningOptions,
        start_time: f64,
    ) -> Result<MultiAgentToolpathSchedule, PlanningError> {
        self.validate(toolpath, dg)?;

        let mut schedule = MultiAgentToolpathSchedule::new();
        for agent in &self.order {
            schedule.add_agent(agent.clone());
        }

        let mut clock: HashMap<&AgentId, f64> =
            self.order.iter().map(|a| (a, start_time)).collect();
        let mut frontier: BTreeSet<usize> = dg.roots().into_iter().collect();
        let mut in_progress: BTreeMap<usize, f64> = BTreeMap::new();

        debug!(
            "planning {} tasks over {} agents from t={start_time}",
            dg.node_count(),
            self.order.len()
        );

        while !frontier.is_empty() {
            let t = self
                .order
                .iter()
                .map(|a| clock[a])
                .fold(f64::INFINITY, f64::min);

            // retire tasks whose contour has finished by now
            let finished: Vec<usize> = in_progress
                .iter()
                .filter(|(_, end)| **end <= t)
                .map(|(n, _)| *n)
                .collect();
            for n in finished {
                dg.mark_complete(n);
                in_progress.remove(&n);
            }

            let due: Vec<&AgentId> = self.order.iter().filter(|a| clock[*a] == t).collect();
            let mut idle: Vec<&AgentId> = Vec::new();

            for agent in due {
                let model = &self.models[agent];

                let mut feasible: Vec<usize> = frontier
                    .iter()
                    .copied()
                    .filter(|n| dg.can_start(*n) && model.can_execute(toolpath.contours[*n].tool))
                    .collect();
                if feasible.is_empty() {
                    idle.push(agent);
                    continue;
                }
                // prefer tasks unlocking more successors
                feasible.sort_by_key(|n| (std::cmp::Reverse(dg.out_degree(*n)), *n));

                let mut assigned = false;
                for n in feasible {
                    let contour = &toolpath.contours[n];
                    let p_start = schedule
                        .get(agent)
                        .expect("every agent is registered")
                        .get_state(t, model.home);
                    let chain = build_event_chain(t, p_start, contour, model, options);

                    if events_cause_collision(
                        &chain,
                        agent,
                        &schedule,
                        &self.models,
                        options.collision_gap_threshold,
                    )? {
                        trace!("task {n} rejected for {agent} at t={t}: collision");
                        continue;
                    }

                    self.splice_idle_suffix(&mut schedule, agent, t);

                    let contour_end = chain[1].end();
                    let depart_end = chain[2].end();
                    schedule.add_events(chain, agent);

                    in_progress.insert(n, contour_end);
                    frontier.remove(&n);
                    for succ in dg.successors(n) {
                        frontier.insert(succ);
                    }
                    clock.insert(agent, depart_end);
                    trace!("task {n} assigned to {agent} at t={t}");
                    assigned = true;
                    break;
                }

                if !assigned {
                    // everything feasible collides right now; retry later
                    clock.insert(agent, t + options.collision_offset);
                }
            }

            if !idle.is_empty() {
                // idle agents wait for something to finish so new successors
                // may appear; with nothing in flight, for the next decision
                // point of a busy agent
                let mut t_next = in_progress
                    .values()
                    .copied()
                    .fold(f64::INFINITY, f64::min);
                if !t_next.is_finite() {
                    t_next = self
                        .order
                        .iter()
                        .map(|a| clock[a])
                        .filter(|c| *c > t)
                        .fold(f64::INFINITY, f64::min);
                }
                if !t_next.is_finite() {
                    t_next = t + options.collision_offset;
                }
                for agent in idle {
                    clock.insert(agent, t_next.max(t));
                }
            }
        }

        Ok(schedule)
    }

    fn validate(
        &self,
        toolpath: &Toolpath,
        dg: &DependencyGraph<usize>,
    ) -> Result<(), PlanningError> {
        if let Some(task) = dg.nodes().find(|n| *n >= toolpath.n_contours()) {
            return Err(PlanningError::UnknownTask { task });
        }
        for contour in &toolpath.contours {
            if !self.models.values().any(|m| m.can_execute(contour.tool)) {
                return Err(PlanningError::UncoverableCapability {
                    tool: contour.tool,
                });
            }
        }
        Ok(())
    }

    /// If the agent's previously committed tail (a return-home move) runs
    /// past the new departure time, replace it with its prefix up to that
    /// time, or drop it when the agent leaves immediately.
    fn splice_idle_suffix(
        &self,
        schedule: &mut MultiAgentToolpathSchedule,
        agent: &str,
        departure: f64,
    ) {
        let overruns = schedule
            .get(agent)
            .is_some_and(|s| !s.is_empty() && s.end_time() > departure);
        if !overruns {
            return;
        }
        let tail = schedule
            .pop_event(agent)
            .expect("a non-empty schedule has a tail event");
        if tail.start() != departure {
            let prefix = tail.trajectory().slice(tail.start(), departure);
            let path: Vec<Vector3<f64>> = prefix.points().iter().map(|p| p.data).collect();
            schedule.add_event(
                Event::Move(MoveEvent::new(tail.start(), path, tail.velocity())),
                agent,
            );
        }
    }
}

/// Assembles the atomic four-event chain for one task assignment:
/// travel (with retract clearance), contour execution, retract departure,
/// and return home.
fn build_event_chain(
    start: f64,
    p_start: Vector3<f64>,
    contour: &Contour,
    model: &AgentModel,
    options: &PlanningOptions,
) -> Vec<Event> {
    let retract = Vector3::new(0.0, 0.0, options.retract_height);
    let first = contour.path[0];
    let last = *contour.path.last().expect("contours have waypoints");
    let p_approach = first + retract;
    let p_depart = last + retract;

    let travel_path = if p_start == p_approach {
        vec![p_start, first]
    } else {
        vec![p_start, p_approach, first]
    };
    let travel = Event::Move(MoveEvent::new(start, travel_path, model.travel_velocity));
    let execute = Event::Contour(ContourEvent::new(
        travel.end(),
        contour.clone(),
        model.velocity,
    ));
    let depart = Event::Move(MoveEvent::new(
        execute.end(),
        vec![last, p_depart],
        model.travel_velocity,
    ));
    let home = Event::Move(MoveEvent::new(
        depart.end(),
        vec![p_depart, model.home],
        model.travel_velocity,
    ));
    vec![travel, execute, depart, home]
}
