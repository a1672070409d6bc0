//! Timed events, schedules, interval algebra, and the task dependency graph.

mod dependency_graph;
mod event;
mod interval;
mod schedule;

pub mod errors;

pub use dependency_graph::DependencyGraph;
pub use errors::GraphError;
pub use event::{ContourEvent, Event, MoveEvent};
pub use interval::{Interval, Seconds};
pub use schedule::{MultiAgentToolpathSchedule, ToolpathSchedule};
