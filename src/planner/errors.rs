use thiserror::Error;

use crate::collision::CollisionError;
use crate::toolpath::ToolId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanningError {
    /// A contour requires a tool no agent is capable of.
    #[error("tool {tool} is required by the toolpath but no agent provides it")]
    UncoverableCapability { tool: ToolId },

    /// The dependency graph names a task the toolpath does not contain.
    #[error("dependency graph references contour index {task} outside the toolpath")]
    UnknownTask { task: usize },

    /// The collision engine failed; planning halts.
    #[error(transparent)]
    Collision(#[from] CollisionError),
}
