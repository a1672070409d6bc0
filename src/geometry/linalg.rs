//! Vector helpers shared by the collision shapes and the planner.

use nalgebra::{Vector2, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("cannot normalize a zero-magnitude vector")]
    DegenerateVector,
}

/// Returns `v / ‖v‖`.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateVector`] when `‖v‖ = 0`.
pub fn unit_vector(v: &Vector3<f64>) -> Result<Vector3<f64>, GeometryError> {
    let norm = v.norm();
    if norm == 0.0 {
        return Err(GeometryError::DegenerateVector);
    }
    Ok(v / norm)
}

/// Normalizes the xy projection of `v`.
///
/// Used to derive the planar heading of an anchored robot from its
/// end-effector position.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateVector`] when the xy projection has
/// zero magnitude.
pub fn unit_vector_xy(v: &Vector3<f64>) -> Result<Vector2<f64>, GeometryError> {
    let xy = Vector2::new(v.x, v.y);
    let norm = xy.norm();
    if norm == 0.0 {
        return Err(GeometryError::DegenerateVector);
    }
    Ok(xy / norm)
}

/// Angle between two vectors in radians, in `[0, π]`.
///
/// The dot product of the unit vectors is clamped to `[-1, 1]` before the
/// arccosine so that antiparallel inputs do not produce NaN.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateVector`] if either input has zero
/// magnitude.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> Result<f64, GeometryError> {
    let ua = unit_vector(a)?;
    let ub = unit_vector(b)?;
    Ok(ua.dot(&ub).clamp(-1.0, 1.0).acos())
}
