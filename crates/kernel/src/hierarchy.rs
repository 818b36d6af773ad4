use finder_common::{SlotArray, TransformId};
use glam::{Mat4, Vec3};
use std::rc::Rc;

use crate::TransformError;
use crate::transform::{Property, Transform, WorldSpaceInfo};

/// Default number of transform slots per hierarchy.
pub const DEFAULT_TRANSFORM_CAPACITY: usize = 999;

/// Owns every transform of one scene and the world bound they share.
///
/// Transforms are addressed by their caller-supplied [`TransformId`]; lookups
/// are linear scans over the slot container. Parent/child links are ids too,
/// so removing or disposing a transform can never leave a dangling link.
#[derive(Debug)]
pub struct TransformSystem {
    info: Option<Rc<WorldSpaceInfo>>,
    transforms: SlotArray<Transform>,
}

impl Default for TransformSystem {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TransformSystem {
    /// Create a hierarchy. `None` uses [`WorldSpaceInfo::default`].
    pub fn new(info: Option<WorldSpaceInfo>) -> Self {
        Self::with_capacity(info, DEFAULT_TRANSFORM_CAPACITY)
    }

    /// Create a hierarchy with room for `capacity` transforms.
    pub fn with_capacity(info: Option<WorldSpaceInfo>, capacity: usize) -> Self {
        Self {
            info: Some(Rc::new(info.unwrap_or_default())),
            transforms: SlotArray::new(capacity),
        }
    }

    /// The shared world bound, or `None` after disposal.
    pub fn info(&self) -> Option<&WorldSpaceInfo> {
        self.info.as_deref()
    }

    /// Whether `dispose` has already run.
    pub fn is_disposed(&self) -> bool {
        self.info.is_none()
    }

    /// Number of live transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether no transform is live.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Live transforms in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Transform> + '_ {
        self.transforms.iter()
    }

    /// Create a transform keyed by `id`.
    ///
    /// Rotation is X/Y/Z Euler angles in radians; see [`crate::compose`].
    pub fn create_transform(
        &mut self,
        scale: Vec3,
        rotation: Vec3,
        translation: Vec3,
        id: TransformId,
    ) -> Result<TransformId, TransformError> {
        let info = self.info.as_ref().ok_or(TransformError::Disposed)?;
        if self.transforms.iter().any(|t| t.id() == id) {
            return Err(TransformError::DuplicateIdentifier(id));
        }
        let transform = Transform::new(id, scale, rotation, translation, Rc::clone(info));
        self.transforms.add(transform)?;
        tracing::debug!(%id, %scale, %rotation, %translation, "transform created");
        Ok(id)
    }

    /// The transform registered under `id`.
    pub fn get_transform(&self, id: TransformId) -> Result<&Transform, TransformError> {
        self.transforms
            .iter()
            .find(|t| t.id() == id)
            .ok_or(TransformError::NotFound(id))
    }

    /// The live model matrix of `id`.
    pub fn matrix(&self, id: TransformId) -> Result<&Mat4, TransformError> {
        self.get_transform(id).map(Transform::matrix)
    }

    /// Local translation of `id`.
    pub fn position(&self, id: TransformId) -> Result<Vec3, TransformError> {
        self.get_transform(id).map(Transform::position)
    }

    /// Local scale of `id`.
    pub fn scale(&self, id: TransformId) -> Result<Vec3, TransformError> {
        self.get_transform(id).map(Transform::scale)
    }

    /// Local rotation of `id`, in radians per axis.
    pub fn rotation(&self, id: TransformId) -> Result<Vec3, TransformError> {
        self.get_transform(id).map(Transform::rotation)
    }

    /// Remove the transform keyed by `id` and unlink its neighbours.
    ///
    /// The slot is located by matching the id, then removed by slot index.
    pub fn remove_transform(&mut self, id: TransformId) -> Result<Transform, TransformError> {
        let index = self.index_of(id)?;
        let mut removed = self
            .transforms
            .remove(index)?
            .ok_or(TransformError::NotFound(id))?;
        if let Some(parent) = removed.parent {
            if let Ok(p) = self.slot_mut(parent) {
                p.child = None;
            }
        }
        if let Some(child) = removed.child {
            if let Ok(c) = self.slot_mut(child) {
                c.parent = None;
            }
        }
        removed.dispose();
        tracing::debug!(%id, "transform removed");
        Ok(removed)
    }

    /// Make `child` the single child of `parent`.
    ///
    /// A previous child of `parent` and a previous parent of `child` are
    /// unlinked first. Links that would close a loop are rejected.
    pub fn attach_child(
        &mut self,
        parent: TransformId,
        child: TransformId,
    ) -> Result<(), TransformError> {
        if self.is_disposed() {
            return Err(TransformError::Disposed);
        }
        if parent == child {
            return Err(TransformError::SelfLink(parent));
        }
        self.index_of(parent)?;
        self.index_of(child)?;

        let mut cursor = Some(child);
        while let Some(id) = cursor {
            if id == parent {
                return Err(TransformError::CycleDetected { parent, child });
            }
            cursor = self.get_transform(id)?.child;
        }

        if let Some(old_child) = self.detach_child(parent)? {
            tracing::debug!(%parent, %old_child, "replaced child link");
        }
        if let Some(old_parent) = self.get_transform(child)?.parent {
            self.slot_mut(old_parent)?.child = None;
        }
        self.slot_mut(parent)?.child = Some(child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Unlink the child of `parent`, returning it if there was one.
    pub fn detach_child(&mut self, parent: TransformId) -> Result<Option<TransformId>, TransformError> {
        let Some(child) = self.slot_mut(parent)?.child.take() else {
            return Ok(None);
        };
        if let Ok(c) = self.slot_mut(child) {
            c.parent = None;
        }
        Ok(Some(child))
    }

    /// Set the translation of `id`, then cascade it down the child chain.
    pub fn set_position(&mut self, id: TransformId, value: Vec3) -> Result<(), TransformError> {
        self.set_cascading(id, Property::Position, value)
    }

    /// Set the scale of `id`, then cascade it down the child chain.
    pub fn set_scale(&mut self, id: TransformId, value: Vec3) -> Result<(), TransformError> {
        self.set_cascading(id, Property::Scale, value)
    }

    /// Set the rotation of `id`, then cascade it. Rotation is never bound-checked.
    pub fn set_rotation(&mut self, id: TransformId, value: Vec3) -> Result<(), TransformError> {
        self.set_cascading(id, Property::Rotation, value)
    }

    /// Tear down every transform's links and bound, then drop the hierarchy's
    /// own bound. Slots are not freed. Idempotent.
    pub fn dispose(&mut self) {
        if self.info.take().is_none() {
            return;
        }
        let mut count = 0usize;
        for t in self.transforms.iter_mut() {
            t.dispose();
            count += 1;
        }
        tracing::debug!(count, "transform system disposed");
    }

    /// Apply `value` to `id`, then walk the child chain adding each node's new
    /// value onto its child's current one.
    ///
    /// A rejection at `id` is returned. A rejection further down only stops
    /// the walk; nodes already updated keep their new values.
    fn set_cascading(
        &mut self,
        id: TransformId,
        property: Property,
        value: Vec3,
    ) -> Result<(), TransformError> {
        let target = self.slot_mut(id)?;
        target.try_set(property, value)?;

        let mut carried = value;
        let mut next = target.child;
        while let Some(child_id) = next {
            let Ok(child) = self.slot_mut(child_id) else {
                tracing::warn!(%id, child = %child_id, "child link points at a missing transform");
                break;
            };
            let candidate = child.get(property) + carried;
            if let Err(e) = child.try_set(property, candidate) {
                tracing::debug!(%id, child = %child_id, %property, "cascade stopped: {e}");
                break;
            }
            carried = candidate;
            next = child.child;
        }
        Ok(())
    }

    fn index_of(&self, id: TransformId) -> Result<usize, TransformError> {
        self.transforms
            .position(|t| t.id() == id)
            .ok_or(TransformError::NotFound(id))
    }

    fn slot_mut(&mut self, id: TransformId) -> Result<&mut Transform, TransformError> {
        let index = self.index_of(id)?;
        self.transforms
            .get_mut(index)?
            .ok_or(TransformError::NotFound(id))
    }
}

impl Drop for TransformSystem {
    fn drop(&mut self) {
        self.dispose();
    }
}
