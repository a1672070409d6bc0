//! Pairing of concurrent trajectory intervals.

use super::Trajectory;

/// Finds the intersections of time supports between two sorted lists of
/// trajectories and slices each trajectory to the shared window.
///
/// Both lists must be internally non-overlapping and sorted by start time
/// (which the schedule materialization guarantees). Runs in O(n + m).
pub fn concurrent_trajectory_pairs(
    lhs: &[Trajectory],
    rhs: &[Trajectory],
) -> Vec<(Trajectory, Trajectory)> {
    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < lhs.len() && j < rhs.len() {
        let (a_start, a_end) = (lhs[i].start_time(), lhs[i].end_time());
        let (b_start, b_end) = (rhs[j].start_time(), rhs[j].end_time());

        if a_start <= b_end && b_start <= a_end {
            let start = a_start.max(b_start);
            let end = a_end.min(b_end);
            pairs.push((lhs[i].slice(start, end), rhs[j].slice(start, end)));
        }

        if a_end < b_end {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}
