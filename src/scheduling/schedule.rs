//! Per-agent event logs and the multi-agent composite schedule.

use std::collections::HashMap;

use nalgebra::Vector3;

use super::event::Event;
use crate::AgentId;

/// An append-only log of timed events for a single agent.
///
/// Events are appended in non-decreasing start order by the planner;
/// `start_time`/`end_time` are cached aggregates (`+∞`/`-∞` while empty, so
/// the first event initializes both).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToolpathSchedule {
    events: Vec<Event>,
    start_time: f64,
    end_time: f64,
}

impl Default for ToolpathSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolpathSchedule {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            start_time: f64::INFINITY,
            end_time: f64::NEG_INFINITY,
        }
    }

    pub fn add_event(&mut self, event: Event) {
        self.start_time = self.start_time.min(event.start());
        self.end_time = self.end_time.max(event.end());
        self.events.push(event);
    }

    pub fn add_events(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.add_event(event);
        }
    }

    /// Removes and returns the most recently appended event, recomputing the
    /// cached bounds.
    pub fn pop_event(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.start_time = self
            .events
            .iter()
            .map(Event::start)
            .fold(f64::INFINITY, f64::min);
        self.end_time = self
            .events
            .iter()
            .map(Event::end)
            .fold(f64::NEG_INFINITY, f64::max);
        Some(event)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn n_events(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Indices of events overlapping the closed window `[t_start, t_end]`.
    pub fn slice_indices(&self, t_start: f64, t_end: f64) -> Vec<usize> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.end() >= t_start && e.start() <= t_end)
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns a new schedule with the events overlapping `[t_start, t_end]`.
    ///
    /// Events are never chopped: an event with any time in the window is
    /// included whole. An empty slice carries the query window as its
    /// bounds, keeping duration arithmetic total.
    pub fn slice(&self, t_start: f64, t_end: f64) -> ToolpathSchedule {
        let mut sliced = ToolpathSchedule::new();
        for i in self.slice_indices(t_start, t_end) {
            sliced.add_event(self.events[i].clone());
        }
        if sliced.is_empty() {
            sliced.start_time = t_start;
            sliced.end_time = t_end;
        }
        sliced
    }

    /// Samples the agent position at `time`.
    ///
    /// Returns the interpolated position when an event covers `time`, the
    /// last completed event's terminal position when `time` falls in a gap,
    /// and `default` when `time` precedes the schedule (or it is empty).
    pub fn get_state(&self, time: f64, default: Vector3<f64>) -> Vector3<f64> {
        let mut state = default;
        if time < self.start_time {
            return state;
        }
        for event in &self.events {
            if event.end() < time {
                state = event.terminal_position();
                continue;
            }
            if event.start() <= time {
                return event
                    .trajectory()
                    .sample(time)
                    .expect("time is inside the event span")
                    .data;
            }
            break;
        }
        state
    }
}

/// Insertion-ordered map of agent schedules with cached global bounds.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiAgentToolpathSchedule {
    order: Vec<AgentId>,
    schedules: HashMap<AgentId, ToolpathSchedule>,
    start_time: f64,
    end_time: f64,
}

impl MultiAgentToolpathSchedule {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            schedules: HashMap::new(),
            start_time: 0.0,
            end_time: 0.0,
        }
    }

    /// Registers an agent with an empty schedule. No-op if already present.
    pub fn add_agent(&mut self, agent: impl Into<AgentId>) {
        let agent = agent.into();
        if !self.schedules.contains_key(&agent) {
            self.order.push(agent.clone());
            self.schedules.insert(agent, ToolpathSchedule::new());
        }
    }

    pub fn add_agents(&mut self, agents: impl IntoIterator<Item = AgentId>) {
        for agent in agents {
            self.add_agent(agent);
        }
    }

    /// Agent ids in insertion order.
    pub fn agents(&self) -> impl Iterator<Item = &AgentId> {
        self.order.iter()
    }

    pub fn get(&self, agent: &str) -> Option<&ToolpathSchedule> {
        self.schedules.get(agent)
    }

    pub fn add_event(&mut self, event: Event, agent: &str) {
        self.add_agent(agent);
        self.start_time = self.start_time.min(event.start());
        self.end_time = self.end_time.max(event.end());
        self.schedules
            .get_mut(agent)
            .expect("agent was just registered")
            .add_event(event);
    }

    pub fn add_events(&mut self, events: impl IntoIterator<Item = Event>, agent: &str) {
        for event in events {
            self.add_event(event, agent);
        }
    }

    /// Replaces the schedule of `agent`, expanding the global bounds.
    pub fn add_schedule(&mut self, schedule: ToolpathSchedule, agent: impl Into<AgentId>) {
        let agent = agent.into();
        self.start_time = self.start_time.min(schedule.start_time());
        self.end_time = self.end_time.max(schedule.end_time());
        if !self.schedules.contains_key(&agent) {
            self.order.push(agent.clone());
        }
        self.schedules.insert(agent, schedule);
    }

    /// Removes the most recent event of `agent`, recomputing global bounds.
    pub(crate) fn pop_event(&mut self, agent: &str) -> Option<Event> {
        let event = self.schedules.get_mut(agent)?.pop_event()?;
        self.start_time = self
            .schedules
            .values()
            .filter(|s| !s.is_empty())
            .map(ToolpathSchedule::start_time)
            .fold(0.0, f64::min);
        self.end_time = self
            .schedules
            .values()
            .filter(|s| !s.is_empty())
            .map(ToolpathSchedule::end_time)
            .fold(0.0, f64::max);
        Some(event)
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Duration of the combined schedule.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn n_agents(&self) -> usize {
        self.schedules.len()
    }

    /// Total number of events across all agents.
    pub fn n_events(&self) -> usize {
        self.schedules.values().map(ToolpathSchedule::n_events).sum()
    }

    /// The agent whose schedule starts first (ties: insertion order).
    pub fn first_started(&self) -> Option<&AgentId> {
        self.extreme_by(|s| s.start_time(), |a, b| a < b)
    }

    /// The agent whose schedule starts last (ties: insertion order).
    pub fn last_started(&self) -> Option<&AgentId> {
        self.extreme_by(|s| s.start_time(), |a, b| a > b)
    }

    /// The agent whose schedule finishes first (ties: insertion order).
    pub fn first_finished(&self) -> Option<&AgentId> {
        self.extreme_by(|s| s.end_time(), |a, b| a < b)
    }

    /// The agent whose schedule finishes last (ties: insertion order).
    pub fn last_finished(&self) -> Option<&AgentId> {
        self.extreme_by(|s| s.end_time(), |a, b| a > b)
    }

    fn extreme_by(
        &self,
        key: impl Fn(&ToolpathSchedule) -> f64,
        better: impl Fn(f64, f64) -> bool,
    ) -> Option<&AgentId> {
        let mut best: Option<(&AgentId, f64)> = None;
        for agent in &self.order {
            let value = key(&self.schedules[agent]);
            if best.is_none() || better(value, best.expect("just checked").1) {
                best = Some((agent, value));
            }
        }
        best.map(|(agent, _)| agent)
    }

    /// Slices every agent schedule to the events overlapping the window.
    ///
    /// An empty result carries `[t_start, t_end]` as its bounds.
    pub fn slice(&self, t_start: f64, t_end: f64) -> MultiAgentToolpathSchedule {
        let mut sliced = MultiAgentToolpathSchedule::new();
        for agent in &self.order {
            sliced.add_schedule(self.schedules[agent].slice(t_start, t_end), agent.clone());
        }
        if sliced.n_events() == 0 {
            sliced.start_time = t_start;
            sliced.end_time = t_end;
            return sliced;
        }
        sliced.start_time = sliced
            .schedules
            .values()
            .map(ToolpathSchedule::start_time)
            .fold(f64::INFINITY, f64::min);
        sliced.end_time = sliced
            .schedules
            .values()
            .map(ToolpathSchedule::end_time)
            .fold(f64::NEG_INFINITY, f64::max);
        sliced
    }

    /// The same schedule displaced `dt` later in time.
    pub fn shifted(&self, dt: f64) -> MultiAgentToolpathSchedule {
        let mut shifted = MultiAgentToolpathSchedule::new();
        for agent in &self.order {
            shifted.add_agent(agent.clone());
            for event in self.schedules[agent].events() {
                shifted.add_event(event.shifted(dt), agent);
            }
        }
        shifted
    }

    /// Appends another schedule's events agent by agent.
    ///
    /// The caller guarantees that `other`'s events do not precede the events
    /// already present (the planner wrappers do).
    pub fn extend_with(&mut self, other: MultiAgentToolpathSchedule) {
        for agent in other.order {
            let schedule = &other.schedules[&agent];
            self.add_agent(agent.clone());
            for event in schedule.events() {
                self.add_event(event.clone(), &agent);
            }
        }
    }

    /// Merges sub-schedules planned independently from time zero: each part
    /// is shifted past the end of everything before it, then concatenated.
    pub fn merge(parts: Vec<MultiAgentToolpathSchedule>) -> MultiAgentToolpathSchedule {
        let mut merged = MultiAgentToolpathSchedule::new();
        for part in parts {
            let offset = merged.end_time();
            merged.extend_with(part.shifted(offset));
        }
        merged
    }
}
