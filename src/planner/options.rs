//! Planner tuning knobs.

/// Options controlling the greedy scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanningOptions {
    /// Vertical clearance added on contour approach and departure. Must be
    /// non-negative.
    pub retract_height: f64,
    /// Time increment an agent's clock advances after a rejected (colliding)
    /// task attempt. Must be positive.
    pub collision_offset: f64,
    /// Maximum per-step displacement of the continuous collision sampler.
    /// Smaller values are more precise and more expensive. Must be positive.
    pub collision_gap_threshold: f64,
}

impl Default for PlanningOptions {
    fn default() -> Self {
        Self {
            retract_height: 50.0,
            collision_offset: 5.0,
            collision_gap_threshold: 1.0,
        }
    }
}
