//! Fixed-capacity, order-preserving slot container with a manual dirty flag.
//!
//! # Invariants
//! - Occupied slots always form a contiguous prefix starting at index 0.
//! - Capacity is fixed at construction and never changes.
//! - `dirty` is raised by `add` and only lowered by `clear_dirty`.

/// Errors from slot container access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("slot index {index} out of range for capacity {capacity}")]
    OutOfRange { index: usize, capacity: usize },
    #[error("slot container is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },
}

/// Dense array of `capacity` slots, each empty or holding one value.
///
/// Removal compacts the tail down by one so iteration never meets a hole
/// before the last live element.
#[derive(Debug, Clone)]
pub struct SlotArray<T> {
    slots: Box<[Option<T>]>,
    dirty: bool,
}

impl<T> SlotArray<T> {
    /// Allocate `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            dirty: false,
        }
    }

    /// Total number of slots, live or empty.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether slot 0 is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.first().is_none_or(Option::is_none)
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Whether an `add` happened since the last `clear_dirty`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Lower the dirty flag after reacting to it.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Store `value` in the first empty slot and return its index.
    pub fn add(&mut self, value: T) -> Result<usize, SlotError> {
        let capacity = self.capacity();
        let Some(index) = self.slots.iter().position(Option::is_none) else {
            tracing::warn!(capacity, "slot container full, value dropped");
            return Err(SlotError::CapacityExceeded { capacity });
        };
        self.slots[index] = Some(value);
        self.dirty = true;
        Ok(index)
    }

    /// Remove the value at `index`, shifting every later slot down by one.
    ///
    /// The vacated final slot is left empty. Removing an empty slot is not an
    /// error and returns `Ok(None)`.
    pub fn remove(&mut self, index: usize) -> Result<Option<T>, SlotError> {
        self.check(index)?;
        let removed = self.slots[index].take();
        self.slots[index..].rotate_left(1);
        Ok(removed)
    }

    /// The slot at `index`, which may be empty.
    pub fn get(&self, index: usize) -> Result<Option<&T>, SlotError> {
        self.check(index)?;
        Ok(self.slots[index].as_ref())
    }

    /// Mutable access to the slot at `index`, which may be empty.
    pub fn get_mut(&mut self, index: usize) -> Result<Option<&mut T>, SlotError> {
        self.check(index)?;
        Ok(self.slots[index].as_mut())
    }

    /// Index of the first live element matching `pred`.
    pub fn position(&self, mut pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.iter().position(|v| pred(v))
    }

    /// Live elements in slot order, stopping at the first empty slot.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().map_while(Option::as_ref)
    }

    /// Mutable live elements in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut().map_while(Option::as_mut)
    }

    /// Empty every slot. Leaves the dirty flag untouched.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    fn check(&self, index: usize) -> Result<(), SlotError> {
        if index >= self.slots.len() {
            return Err(SlotError::OutOfRange {
                index,
                capacity: self.slots.len(),
            });
        }
        Ok(())
    }
}

impl<'a, T> IntoIterator for &'a SlotArray<T> {
    type Item = &'a T;
    type IntoIter = std::iter::MapWhile<
        std::slice::Iter<'a, Option<T>>,
        fn(&'a Option<T>) -> Option<&'a T>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.slots
            .iter()
            .map_while(Option::as_ref as fn(&'a Option<T>) -> Option<&'a T>)
    }
}
