//! SE(3) pose value type.

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};

/// A rigid-body pose: rotation plus translation on the group SE(3).
///
/// Stored as a translation / unit-quaternion pair so interpolation is a
/// single slerp plus a lerp. Composition, inversion and vector rotation
/// follow the usual group operations.
///
/// # Example
///
/// ```
/// use coprint::geometry::Pose;
/// use nalgebra::Vector3;
///
/// let lift = Pose::from_translation(Vector3::new(0.0, 0.0, 2.0));
/// let yaw = Pose::rz(std::f64::consts::FRAC_PI_2);
/// let pose = lift.compose(&yaw);
/// let p = pose.transform_point(&Vector3::new(1.0, 0.0, 0.0));
/// assert!((p.y - 1.0).abs() < 1e-12);
/// assert!((p.z - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    iso: Isometry3<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            iso: Isometry3::identity(),
        }
    }

    pub fn from_translation(t: Vector3<f64>) -> Self {
        Self {
            iso: Isometry3::from_parts(Translation3::from(t), UnitQuaternion::identity()),
        }
    }

    /// Rotation of `theta` radians about the world X axis.
    pub fn rx(theta: f64) -> Self {
        Self::from_rotation(UnitQuaternion::from_axis_angle(&Vector3::x_axis(), theta))
    }

    /// Rotation of `theta` radians about the world Y axis.
    pub fn ry(theta: f64) -> Self {
        Self::from_rotation(UnitQuaternion::from_axis_angle(&Vector3::y_axis(), theta))
    }

    /// Rotation of `theta` radians about the world Z axis.
    pub fn rz(theta: f64) -> Self {
        Self::from_rotation(UnitQuaternion::from_axis_angle(&Vector3::z_axis(), theta))
    }

    /// Pose from quaternion components `{w, x, y, z}` (normalized on entry).
    pub fn from_quaternion(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self::from_rotation(UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)))
    }

    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            iso: Isometry3::from_parts(Translation3::identity(), rotation),
        }
    }

    pub fn from_parts(t: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            iso: Isometry3::from_parts(Translation3::from(t), rotation),
        }
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.iso.translation.vector
    }

    pub fn set_translation(&mut self, t: Vector3<f64>) {
        self.iso.translation = Translation3::from(t);
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.iso.rotation
    }

    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.iso
    }

    /// Composition `self ∘ other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose {
            iso: self.iso * other.iso,
        }
    }

    pub fn inverse(&self) -> Pose {
        Pose {
            iso: self.iso.inverse(),
        }
    }

    /// Interpolates toward `other` at `s ∈ [0, 1]`: slerp on the rotation,
    /// lerp on the translation.
    pub fn interp(&self, other: &Pose, s: f64) -> Pose {
        Pose {
            iso: self.iso.lerp_slerp(&other.iso, s),
        }
    }

    /// Rotates a free vector by the rotational component only.
    pub fn rotate_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.iso.rotation * v
    }

    /// Transforms a point: rotation followed by translation.
    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotate_vector(p) + self.translation()
    }

    /// Approximate structural equality: componentwise on the translation and
    /// angular distance on the rotation, both against `atol + rtol * |b|`.
    pub fn approx_eq(&self, other: &Pose, rtol: f64, atol: f64) -> bool {
        let ta = self.translation();
        let tb = other.translation();
        for i in 0..3 {
            if (ta[i] - tb[i]).abs() > atol + rtol * tb[i].abs() {
                return false;
            }
        }
        self.rotation().angle_to(&other.rotation()) <= atol + rtol
    }
}

impl std::ops::Mul for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}
