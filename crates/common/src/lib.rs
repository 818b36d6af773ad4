//! Shared ids, hashing and the slot container used by every finder subsystem.

pub mod slots;
pub mod types;

pub use slots::{SlotArray, SlotError};
pub use types::{EntityHash, TransformId, fnv1a64};
