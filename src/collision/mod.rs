//! Collision shapes and the continuous collision engine.
//!
//! Shapes are pose-parameterized swept volumes with a uniform pairwise
//! [`CollisionShape::in_collision`] test; the sweep functions check whole
//! trajectories against each other by stepping shape poses along concurrent
//! time windows.

mod error;
mod shapes;
mod sweep;

pub use error::CollisionError;
pub use shapes::{CollisionGroup, CollisionShape};
pub use sweep::{
    check_trajectory_collision, continuous_collide, trajectory_collision_query,
    TrajectoryStateInterpolator,
};
