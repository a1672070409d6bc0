//! Geometry and pose kernel: R3 helpers and SE(3) value types.

pub mod linalg;
mod pose;

pub use linalg::{angle_between, unit_vector, unit_vector_xy, GeometryError};
pub use pose::Pose;
