use crate::geometry::GeometryError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollisionError {
    #[error("collision test between {0} and {1} shapes is not supported")]
    IncompatibleShapePair(&'static str, &'static str),

    #[error("cannot derive a collision time step: no trajectory with positive length and duration")]
    DegenerateTrajectory,

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
