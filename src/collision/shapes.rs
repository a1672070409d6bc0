//! Swept collision volumes with a uniform pairwise test.

use nalgebra::{UnitQuaternion, Vector2, Vector3};
use parry3d_f64::query;
use parry3d_f64::shape::Cuboid;

use super::error::CollisionError;
use crate::geometry::{unit_vector_xy, GeometryError, Pose};

/// Tolerance for the signed-orientation tests in the planar segment
/// intersection. Near-collinear triples below this threshold are treated as
/// collinear.
const ORIENTATION_TOL: f64 = 1e-2;

/// Orientation of the ordered triple `(p, q, r)` in the plane:
/// `0` collinear, `1` clockwise, `2` counterclockwise.
fn orientation(p: &Vector2<f64>, q: &Vector2<f64>, r: &Vector2<f64>) -> u8 {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val > ORIENTATION_TOL {
        1
    } else if val < -ORIENTATION_TOL {
        2
    } else {
        0
    }
}

/// For collinear `p`, `q`, `r`: does `q` lie on the segment `pr`?
fn on_segment(p: &Vector2<f64>, q: &Vector2<f64>, r: &Vector2<f64>) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Planar segment intersection `[p1, q1]` vs `[p2, q2]` with the classic
/// orientation test plus the collinear-overlap special cases.
fn segments_intersect(
    p1: &Vector2<f64>,
    q1: &Vector2<f64>,
    p2: &Vector2<f64>,
    q2: &Vector2<f64>,
) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 {
        return true;
    }
    if o1 == 0 && on_segment(p1, p2, q1) {
        return true;
    }
    if o2 == 0 && on_segment(p1, q2, q1) {
        return true;
    }
    if o3 == 0 && on_segment(p2, p1, q2) {
        return true;
    }
    if o4 == 0 && on_segment(p2, q1, q2) {
        return true;
    }
    false
}

fn xy(v: &Vector3<f64>) -> Vector2<f64> {
    Vector2::new(v.x, v.y)
}

/// A robot idealized as the segment from a fixed base to the moving tip.
///
/// Collision is the planar (xy) intersection of the two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineShape {
    pub base: Vector3<f64>,
    pub(crate) pose: Pose,
}

/// A [`LineShape`] with a disc of the given radius at the tip; two shapes
/// additionally collide when their tips come closer than the radii sum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineWithDiscShape {
    pub base: Vector3<f64>,
    pub radius: f64,
    pub(crate) pose: Pose,
}

/// A free-floating oriented box of full dimensions `dims`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrientedBoxShape {
    pub dims: Vector3<f64>,
    pub(crate) pose: Pose,
}

/// A robot bounding box pinned at a planar anchor.
///
/// Setting the translation places the end-effector tip in the world; the
/// shape derives the yaw that points the local +x axis from the anchor
/// toward the tip and positions the box behind the tip by half its length
/// (plus `offset`, expressed in the end-effector frame). The box center's z
/// is clamped to the anchor height. Both the end-effector pose (used by
/// trajectory sampling) and the box pose (used for collision) are
/// maintained.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchoredBoxArmShape {
    pub dims: Vector3<f64>,
    pub anchor: Vector3<f64>,
    pub offset: Vector3<f64>,
    box_center_in_eef: Vector3<f64>,
    pub(crate) eef_pose: Pose,
    pub(crate) box_pose: Pose,
}

impl AnchoredBoxArmShape {
    fn new(dims: Vector3<f64>, anchor: Vector3<f64>, offset: Vector3<f64>) -> Self {
        let box_center_in_eef = offset + Vector3::new(-dims.x * 0.5, 0.0, 0.0);
        let mut initial_center = box_center_in_eef;
        initial_center.z = anchor.z;
        Self {
            dims,
            anchor,
            offset,
            box_center_in_eef,
            eef_pose: Pose::identity(),
            box_pose: Pose::from_translation(initial_center),
        }
    }

    /// Places the end-effector tip at `p` and re-derives both poses.
    fn set_tip(&mut self, p: Vector3<f64>) -> Result<(), GeometryError> {
        let dir = unit_vector_xy(&(p - self.anchor))?;
        let yaw = dir.y.atan2(dir.x);
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw);

        self.eef_pose = Pose::from_parts(p, rotation);
        let mut center = self.eef_pose.transform_point(&self.box_center_in_eef);
        center.z = self.anchor.z;
        self.box_pose = Pose::from_parts(center, rotation);
        Ok(())
    }

    /// The pose of the swept box (center + yaw), as used for collision.
    pub fn box_pose(&self) -> Pose {
        self.box_pose
    }
}

/// A pose-parameterized swept collision volume.
///
/// Every variant supports setting the pose/translation and a pairwise
/// [`in_collision`](Self::in_collision) test. Tests between unsupported
/// variant pairs fail with [`CollisionError::IncompatibleShapePair`]; the
/// supported pairs are line/line, disc/disc, and any combination of the two
/// box variants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionShape {
    Line(LineShape),
    LineWithDisc(LineWithDiscShape),
    OrientedBox(OrientedBoxShape),
    AnchoredBoxArm(AnchoredBoxArmShape),
}

impl CollisionShape {
    /// Segment shape from a fixed `base`; the tip follows the translation.
    pub fn line(base: Vector3<f64>) -> Self {
        Self::Line(LineShape {
            base,
            pose: Pose::identity(),
        })
    }

    pub fn line_with_disc(base: Vector3<f64>, radius: f64) -> Self {
        Self::LineWithDisc(LineWithDiscShape {
            base,
            radius,
            pose: Pose::identity(),
        })
    }

    /// Box of full dimensions `(lx, ly, lz)` centered on its pose.
    pub fn oriented_box(lx: f64, ly: f64, lz: f64) -> Self {
        Self::OrientedBox(OrientedBoxShape {
            dims: Vector3::new(lx, ly, lz),
            pose: Pose::identity(),
        })
    }

    /// Robot bounding box pinned at `anchor`; see [`AnchoredBoxArmShape`].
    pub fn anchored_box_arm(dims: Vector3<f64>, anchor: Vector3<f64>, offset: Vector3<f64>) -> Self {
        Self::AnchoredBoxArm(AnchoredBoxArmShape::new(dims, anchor, offset))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::LineWithDisc(_) => "line-with-disc",
            Self::OrientedBox(_) => "oriented-box",
            Self::AnchoredBoxArm(_) => "anchored-box-arm",
        }
    }

    /// The shape's reference translation. For the anchored arm this is the
    /// end-effector tip, not the box center.
    pub fn translation(&self) -> Vector3<f64> {
        match self {
            Self::Line(s) => s.pose.translation(),
            Self::LineWithDisc(s) => s.pose.translation(),
            Self::OrientedBox(s) => s.pose.translation(),
            Self::AnchoredBoxArm(s) => s.eef_pose.translation(),
        }
    }

    /// Moves the shape's reference translation to `p`.
    ///
    /// # Errors
    ///
    /// The anchored arm derives its heading from `p`; placing the tip
    /// directly above the anchor fails with
    /// [`GeometryError::DegenerateVector`].
    pub fn set_translation(&mut self, p: Vector3<f64>) -> Result<(), GeometryError> {
        match self {
            Self::Line(s) => s.pose.set_translation(p),
            Self::LineWithDisc(s) => s.pose.set_translation(p),
            Self::OrientedBox(s) => s.pose.set_translation(p),
            Self::AnchoredBoxArm(s) => s.set_tip(p)?,
        }
        Ok(())
    }

    /// The shape's reference pose. For the anchored arm this is the
    /// end-effector pose.
    pub fn pose(&self) -> Pose {
        match self {
            Self::Line(s) => s.pose,
            Self::LineWithDisc(s) => s.pose,
            Self::OrientedBox(s) => s.pose,
            Self::AnchoredBoxArm(s) => s.eef_pose,
        }
    }

    /// Sets the full pose. The anchored arm's orientation is derived, not
    /// free, so for that variant this reduces to placing the tip at the
    /// pose's translation.
    pub fn set_pose(&mut self, pose: Pose) -> Result<(), GeometryError> {
        match self {
            Self::Line(s) => s.pose = pose,
            Self::LineWithDisc(s) => s.pose = pose,
            Self::OrientedBox(s) => s.pose = pose,
            Self::AnchoredBoxArm(s) => s.set_tip(pose.translation())?,
        }
        Ok(())
    }

    /// Pairwise collision test at the current poses.
    ///
    /// # Errors
    ///
    /// [`CollisionError::IncompatibleShapePair`] for unsupported variant
    /// combinations.
    pub fn in_collision(&self, other: &CollisionShape) -> Result<bool, CollisionError> {
        use CollisionShape::*;
        match (self, other) {
            (Line(a), Line(b)) => Ok(segments_intersect(
                &xy(&a.base),
                &xy(&a.pose.translation()),
                &xy(&b.base),
                &xy(&b.pose.translation()),
            )),
            (LineWithDisc(a), LineWithDisc(b)) => {
                let tip_a = a.pose.translation();
                let tip_b = b.pose.translation();
                if segments_intersect(&xy(&a.base), &xy(&tip_a), &xy(&b.base), &xy(&tip_b)) {
                    return Ok(true);
                }
                Ok((tip_a - tip_b).norm() < a.radius + b.radius)
            }
            (OrientedBox(a), OrientedBox(b)) => Ok(boxes_intersect(
                &a.pose, &a.dims, &b.pose, &b.dims,
            )),
            (OrientedBox(a), AnchoredBoxArm(b)) => Ok(boxes_intersect(
                &a.pose, &a.dims, &b.box_pose, &b.dims,
            )),
            (AnchoredBoxArm(a), OrientedBox(b)) => Ok(boxes_intersect(
                &a.box_pose, &a.dims, &b.pose, &b.dims,
            )),
            (AnchoredBoxArm(a), AnchoredBoxArm(b)) => Ok(boxes_intersect(
                &a.box_pose, &a.dims, &b.box_pose, &b.dims,
            )),
            (a, b) => Err(CollisionError::IncompatibleShapePair(a.kind(), b.kind())),
        }
    }
}

/// Exact oriented-box intersection, delegated to parry.
fn boxes_intersect(pose_a: &Pose, dims_a: &Vector3<f64>, pose_b: &Pose, dims_b: &Vector3<f64>) -> bool {
    let cuboid_a = Cuboid::new(dims_a * 0.5);
    let cuboid_b = Cuboid::new(dims_b * 0.5);
    query::intersection_test(pose_a.isometry(), &cuboid_a, pose_b.isometry(), &cuboid_b)
        .expect("cuboid pairs are always supported by parry")
}

/// A set of shapes checked pairwise.
#[derive(Debug, Clone)]
pub struct CollisionGroup {
    shapes: Vec<CollisionShape>,
}

impl CollisionGroup {
    pub fn new(shapes: Vec<CollisionShape>) -> Self {
        Self { shapes }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[CollisionShape] {
        &self.shapes
    }

    pub fn shape_mut(&mut self, index: usize) -> &mut CollisionShape {
        &mut self.shapes[index]
    }

    /// True if any pair of shapes in the group collides.
    pub fn in_collision(&self) -> Result<bool, CollisionError> {
        for i in 0..self.shapes.len() {
            for j in i + 1..self.shapes.len() {
                if self.shapes[i].in_collision(&self.shapes[j])? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
