//! Contours and toolpaths: the work to be scheduled.

mod layers;

pub use layers::{dependency_graph_by_layers, split_by_layers};

use nalgebra::Vector3;

/// Identifier for the tool/material a contour must be executed with.
///
/// Tool identity is opaque to the scheduler; it is only matched against agent
/// capability sets.
pub type ToolId = i64;

/// A contiguous polyline of 3D waypoints executed with a single tool.
///
/// The path is immutable once the contour enters the scheduler; the planner
/// expects at least two points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contour {
    pub path: Vec<Vector3<f64>>,
    pub tool: ToolId,
}

impl Contour {
    pub fn new(path: Vec<Vector3<f64>>, tool: ToolId) -> Self {
        Self { path, tool }
    }

    /// Sum of distances between consecutive waypoints. `0.0` for paths with
    /// fewer than two points.
    pub fn path_length(&self) -> f64 {
        self.path.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// Number of linear segments: one less than the number of waypoints.
    pub fn n_segments(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// An ordered list of contours.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Toolpath {
    pub contours: Vec<Contour>,
}

impl Toolpath {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn n_contours(&self) -> usize {
        self.contours.len()
    }

    /// The unique tools referenced by this toolpath, in ascending order.
    pub fn tools(&self) -> Vec<ToolId> {
        let mut tools: Vec<ToolId> = self.contours.iter().map(|c| c.tool).collect();
        tools.sort_unstable();
        tools.dedup();
        tools
    }

    /// Concatenates multiple toolpaths into one, preserving contour order.
    pub fn combine(toolpaths: Vec<Toolpath>) -> Toolpath {
        Toolpath {
            contours: toolpaths.into_iter().flat_map(|t| t.contours).collect(),
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use crate::test_utils::vec3;

    #[test]
    fn toolpath_round_trips_through_json() {
        let toolpath = Toolpath::new(vec![Contour::new(
            vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.5, 0.0)],
            2,
        )]);
        let json = serde_json::to_string(&toolpath).unwrap();
        let back: Toolpath = serde_json::from_str(&json).unwrap();
        assert_eq!(toolpath, back);
    }
}
