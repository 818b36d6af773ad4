use finder_common::TransformId;
use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use crate::TransformError;

/// Symmetric spatial bound shared by every transform of one hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldSpaceInfo {
    /// Half extent per axis; valid coordinates lie in `[-bound, +bound]`.
    pub world_bound: Vec3,
}

impl Default for WorldSpaceInfo {
    fn default() -> Self {
        Self::new(Vec3::splat(200.0))
    }
}

impl WorldSpaceInfo {
    /// A world space clamped to `±world_bound` on each axis.
    pub fn new(world_bound: Vec3) -> Self {
        Self { world_bound }
    }

    /// Whether every axis of `v` lies within the bound. NaN is never contained.
    pub fn contains(&self, v: Vec3) -> bool {
        (v.cmpge(-self.world_bound) & v.cmple(self.world_bound)).all()
    }
}

/// The spatial property a setter targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Position,
    Scale,
    Rotation,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Position => "position",
            Self::Scale => "scale",
            Self::Rotation => "rotation",
        })
    }
}

/// Compose a model matrix that scales, then rotates about X, Y and Z (radians),
/// then translates a point.
///
/// The product order matters: Euler rotations do not commute.
pub fn compose(scale: Vec3, rotation: Vec3, translation: Vec3) -> Mat4 {
    Mat4::from_translation(translation)
        * Mat4::from_rotation_z(rotation.z)
        * Mat4::from_rotation_y(rotation.y)
        * Mat4::from_rotation_x(rotation.x)
        * Mat4::from_scale(scale)
}

/// Split a matrix built by [`compose`] back into `(scale, rotation, translation)`.
///
/// Rotation comes back as X/Y/Z Euler angles with Y in `[-π/2, π/2]`.
pub fn decompose(model: &Mat4) -> (Vec3, Vec3, Vec3) {
    let (scale, rotation, translation) = model.to_scale_rotation_translation();
    let r = Mat3::from_quat(rotation);
    let euler = Vec3::new(
        r.y_axis.z.atan2(r.z_axis.z),
        (-r.x_axis.z).clamp(-1.0, 1.0).asin(),
        r.x_axis.y.atan2(r.x_axis.x),
    );
    (scale, euler, translation)
}

/// Spatial state of one object.
///
/// The model matrix is recomputed in place whenever a component changes.
/// Parent and child are id handles resolved by the owning
/// [`TransformSystem`](crate::TransformSystem), never references.
#[derive(Debug)]
pub struct Transform {
    id: TransformId,
    scale: Vec3,
    rotation: Vec3,
    translation: Vec3,
    model: Mat4,
    bound: Option<Rc<WorldSpaceInfo>>,
    pub(crate) parent: Option<TransformId>,
    pub(crate) child: Option<TransformId>,
}

impl Transform {
    pub(crate) fn new(
        id: TransformId,
        scale: Vec3,
        rotation: Vec3,
        translation: Vec3,
        bound: Rc<WorldSpaceInfo>,
    ) -> Self {
        Self {
            id,
            scale,
            rotation,
            translation,
            model: compose(scale, rotation, translation),
            bound: Some(bound),
            parent: None,
            child: None,
        }
    }

    /// Caller-supplied identifier.
    pub fn id(&self) -> TransformId {
        self.id
    }

    /// Local translation.
    pub fn position(&self) -> Vec3 {
        self.translation
    }

    /// Local scale.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Euler angles in radians, applied X then Y then Z.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// The live model matrix.
    pub fn matrix(&self) -> &Mat4 {
        &self.model
    }

    /// Parent transform, if attached.
    pub fn parent(&self) -> Option<TransformId> {
        self.parent
    }

    /// Direct child transform, if any.
    pub fn child(&self) -> Option<TransformId> {
        self.child
    }

    /// True once the hierarchy has torn this transform's references down.
    pub fn is_disposed(&self) -> bool {
        self.bound.is_none()
    }

    /// Current value of one TRS component.
    pub fn get(&self, property: Property) -> Vec3 {
        match property {
            Property::Position => self.translation,
            Property::Scale => self.scale,
            Property::Rotation => self.rotation,
        }
    }

    /// Validate and apply one property. On rejection nothing changes.
    ///
    /// Position is checked as `value * scale`, scale as `value * position`.
    /// Rotation is never bound-checked.
    pub(crate) fn try_set(&mut self, property: Property, value: Vec3) -> Result<(), TransformError> {
        let bound = self.bound.as_deref().ok_or(TransformError::Disposed)?;
        let candidate = match property {
            Property::Position => Some(value * self.scale),
            Property::Scale => Some(value * self.translation),
            Property::Rotation => None,
        };
        if let Some(candidate) = candidate {
            if !bound.contains(candidate) {
                return Err(TransformError::OutOfBounds {
                    id: self.id,
                    property,
                    candidate,
                    bound: bound.world_bound,
                });
            }
        }
        match property {
            Property::Position => self.translation = value,
            Property::Scale => self.scale = value,
            Property::Rotation => self.rotation = value,
        }
        self.model = compose(self.scale, self.rotation, self.translation);
        Ok(())
    }

    /// Drop the links and the shared bound. The matrix stays readable.
    pub(crate) fn dispose(&mut self) {
        self.parent = None;
        self.child = None;
        self.bound = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    #[test]
    fn default_bound_is_200() {
        assert_eq!(WorldSpaceInfo::default().world_bound, Vec3::splat(200.0));
    }

    #[test]
    fn contains_is_inclusive_and_rejects_nan() {
        let info = WorldSpaceInfo::new(Vec3::splat(10.0));
        assert!(info.contains(Vec3::new(10.0, -10.0, 0.0)));
        assert!(!info.contains(Vec3::new(10.01, 0.0, 0.0)));
        assert!(!info.contains(Vec3::new(0.0, 0.0, -11.0)));
        assert!(!info.contains(Vec3::new(f32::NAN, 0.0, 0.0)));
    }

    #[test]
    fn compose_scales_then_rotates_then_translates() {
        let m = compose(
            Vec3::splat(2.0),
            Vec3::new(0.0, 0.0, FRAC_PI_2),
            Vec3::new(1.0, 0.0, 0.0),
        );
        let p = m.transform_point3(Vec3::X);
        assert!(approx(p, Vec3::new(1.0, 2.0, 0.0)), "got {p}");
    }

    #[test]
    fn compose_rotates_x_before_y() {
        let m = compose(Vec3::ONE, Vec3::new(FRAC_PI_2, FRAC_PI_2, 0.0), Vec3::ZERO);
        let p = m.transform_point3(Vec3::Y);
        // X first sends +Y to +Z, then Y sends +Z to +X.
        assert!(approx(p, Vec3::X), "got {p}");
    }

    #[test]
    fn decompose_round_trips() {
        let scale = Vec3::new(1.0, 2.0, 3.0);
        let rotation = Vec3::new(0.3, -0.5, 1.1);
        let translation = Vec3::new(4.0, -5.0, 6.0);
        let (s, r, t) = decompose(&compose(scale, rotation, translation));
        assert!(approx(s, scale), "scale {s}");
        assert!(approx(r, rotation), "rotation {r}");
        assert!(approx(t, translation), "translation {t}");
    }

    #[test]
    fn rejected_set_leaves_matrix_untouched() {
        let info = Rc::new(WorldSpaceInfo::new(Vec3::splat(10.0)));
        let mut t = Transform::new(TransformId(1), Vec3::ONE, Vec3::ZERO, Vec3::ZERO, info);
        let before = *t.matrix();
        let err = t.try_set(Property::Position, Vec3::new(20.0, 0.0, 0.0));
        assert!(matches!(err, Err(TransformError::OutOfBounds { .. })));
        assert_eq!(*t.matrix(), before);
        assert_eq!(t.position(), Vec3::ZERO);
    }

    #[test]
    fn position_check_uses_scale() {
        let info = Rc::new(WorldSpaceInfo::new(Vec3::splat(10.0)));
        let mut t = Transform::new(TransformId(1), Vec3::splat(4.0), Vec3::ZERO, Vec3::ZERO, info);
        // 3 * 4 = 12 is out of bounds even though 3 alone is not.
        assert!(t.try_set(Property::Position, Vec3::new(3.0, 0.0, 0.0)).is_err());
        assert!(t.try_set(Property::Position, Vec3::new(2.0, 0.0, 0.0)).is_ok());
        assert_eq!(t.position(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn rotation_is_never_bound_checked() {
        let info = Rc::new(WorldSpaceInfo::new(Vec3::splat(1.0)));
        let mut t = Transform::new(TransformId(1), Vec3::ONE, Vec3::ZERO, Vec3::ZERO, info);
        t.try_set(Property::Rotation, Vec3::splat(50.0)).unwrap();
        assert_eq!(t.rotation(), Vec3::splat(50.0));
    }

    #[test]
    fn disposed_transform_rejects_mutation() {
        let info = Rc::new(WorldSpaceInfo::default());
        let mut t = Transform::new(TransformId(1), Vec3::ONE, Vec3::ZERO, Vec3::ZERO, info);
        t.child = Some(TransformId(2));
        t.dispose();
        assert!(t.is_disposed());
        assert_eq!(t.child(), None);
        assert!(matches!(
            t.try_set(Property::Rotation, Vec3::ONE),
            Err(TransformError::Disposed)
        ));
    }
}
