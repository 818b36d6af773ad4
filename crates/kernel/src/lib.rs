//! Transform kernel: per-object spatial state and the hierarchy that owns it.
//!
//! # Invariants
//! - Transform ids are unique within one hierarchy.
//! - A rejected position/scale update leaves the model matrix untouched.
//! - Updates cascade additively down the child chain; chains are acyclic.
//! - Every transform of a hierarchy shares one immutable world bound.

pub mod hierarchy;
pub mod transform;

pub use hierarchy::{DEFAULT_TRANSFORM_CAPACITY, TransformSystem};
pub use transform::{Property, Transform, WorldSpaceInfo, compose, decompose};

use finder_common::{SlotError, TransformId};
use glam::Vec3;

/// Errors from transform hierarchy operations.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("transform {0} already exists")]
    DuplicateIdentifier(TransformId),
    #[error("transform {0} not found")]
    NotFound(TransformId),
    #[error("transform {id}: {property} {candidate} exceeds world bound {bound}")]
    OutOfBounds {
        id: TransformId,
        property: Property,
        candidate: Vec3,
        bound: Vec3,
    },
    #[error("transform {0} cannot be its own child")]
    SelfLink(TransformId),
    #[error("linking {child} under {parent} would create a cycle")]
    CycleDetected {
        parent: TransformId,
        child: TransformId,
    },
    #[error("transform system has been disposed")]
    Disposed,
    #[error(transparent)]
    Slot(#[from] SlotError),
}
