use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("adding this dependency would create a cycle in the task graph")]
    CycleDetected,
}
