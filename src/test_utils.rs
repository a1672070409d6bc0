//! Shared fixtures for the test suites.

use nalgebra::Vector3;

use crate::trajectory::TrajectoryPoint;

pub(crate) fn vec3(x: f64, y: f64, z: f64) -> Vector3<f64> {
    Vector3::new(x, y, z)
}

pub(crate) fn tp(x: f64, y: f64, z: f64, time: f64) -> TrajectoryPoint {
    TrajectoryPoint::new(vec3(x, y, z), time)
}
