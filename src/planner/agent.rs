//! The agent value object.

use std::collections::HashSet;

use nalgebra::Vector3;

use crate::collision::CollisionShape;
use crate::toolpath::ToolId;

/// Static description of one robot in the team.
///
/// # Invariants
///
/// - `velocity` and `travel_velocity` are positive
/// - `capabilities` is the finite set of tools this agent can execute
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentModel {
    /// Tools this agent can execute.
    pub capabilities: HashSet<ToolId>,
    /// Swept volume used for pairwise collision checks.
    pub collision_shape: CollisionShape,
    /// The robot base position in the world frame.
    pub base_frame: Vector3<f64>,
    /// Parking position the agent returns to between tasks.
    pub home: Vector3<f64>,
    /// Speed while executing contours.
    pub velocity: f64,
    /// Speed while travelling between contours.
    pub travel_velocity: f64,
}

impl AgentModel {
    pub fn new(
        capabilities: impl IntoIterator<Item = ToolId>,
        collision_shape: CollisionShape,
        base_frame: Vector3<f64>,
        home: Vector3<f64>,
        velocity: f64,
        travel_velocity: f64,
    ) -> Self {
        debug_assert!(velocity > 0.0 && travel_velocity > 0.0);
        Self {
            capabilities: capabilities.into_iter().collect(),
            collision_shape,
            base_frame,
            home,
            velocity,
            travel_velocity,
        }
    }

    pub fn can_execute(&self, tool: ToolId) -> bool {
        self.capabilities.contains(&tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::vec3;

    #[test]
    fn capabilities_gate_tools() {
        let agent = AgentModel::new(
            [0, 2],
            CollisionShape::oriented_box(1.0, 1.0, 1.0),
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            10.0,
            20.0,
        );
        assert!(agent.can_execute(0));
        assert!(!agent.can_execute(1));
        assert!(agent.can_execute(2));
    }
}
