//! The multi-agent toolpath planner and its wrappers.

mod agent;
mod batched;
mod errors;
mod options;
mod scheduler;
mod toolpath_collision;

pub use agent::AgentModel;
pub use batched::{
    BatchedParallelPlanner, BatchedSequentialPlanner, DepthBasedParallelPlanner,
    DepthBasedSequentialPlanner,
};
pub use errors::PlanningError;
pub use options::PlanningOptions;
pub use scheduler::MultiAgentToolpathPlanner;
pub use toolpath_collision::{
    events_cause_collision, schedule_to_trajectories, schedule_to_trajectory,
};
