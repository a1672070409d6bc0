//! coprint - collision-aware toolpath scheduling for cooperating robots
//!
//! A planning library that turns a partially ordered additive-manufacturing
//! toolpath into conflict-free, time-indexed motion schedules for a
//! heterogeneous team of robot arms. The scheduler guarantees that no two
//! agents are ever in spatial collision and that every precedence constraint
//! between contours is honored.

pub mod collision;
pub mod geometry;
pub mod planner;
pub mod scheduling;
pub mod toolpath;
pub mod trajectory;

#[cfg(test)]
pub(crate) mod test_utils;

/// Identifier type for agents (robots) in a multi-agent schedule.
pub type AgentId = String;

pub use planner::{AgentModel, MultiAgentToolpathPlanner, PlanningError, PlanningOptions};
pub use scheduling::{DependencyGraph, MultiAgentToolpathSchedule, ToolpathSchedule};
pub use toolpath::{Contour, Toolpath};
