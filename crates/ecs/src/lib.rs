//! Entity registry: a named-handle table stored in a fixed-capacity slot container.
//!
//! Entities carry no components of their own. Their value-derived hash is the
//! foreign key into the transform hierarchy.
//!
//! # Invariants
//! - Lookups scan live entities in slot order; the first match wins.
//! - Removal compacts the container, so slot order is creation order minus removals.

use finder_common::{EntityHash, SlotArray, SlotError};
use serde::{Deserialize, Serialize};

/// Default number of entity slots per registry.
pub const DEFAULT_ENTITY_CAPACITY: usize = 999;

/// A named entity. Its identity hash is derived from the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
}

impl Entity {
    /// An entity named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Identity hash. Entities with equal names hash equally.
    pub fn hash(&self) -> EntityHash {
        EntityHash::of_name(&self.name)
    }
}

/// Errors from entity registry operations.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error("no entity named {0:?}")]
    NameNotFound(String),
    #[error("no entity with hash {0}")]
    HashNotFound(EntityHash),
    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// Registry of live entities.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    entities: SlotArray<Entity>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// An empty registry with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ENTITY_CAPACITY)
    }

    /// An empty registry with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: SlotArray::new(capacity),
        }
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry holds no entity.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter()
    }

    /// Create and store an entity, returning a copy of it.
    pub fn create_entity(&mut self, name: impl Into<String>) -> Result<Entity, EntityError> {
        let entity = Entity::new(name);
        self.entities.add(entity.clone())?;
        tracing::debug!(name = %entity.name, hash = %entity.hash(), "entity created");
        Ok(entity)
    }

    /// First live entity named `name`.
    pub fn get_entity_by_name(&self, name: &str) -> Result<&Entity, EntityError> {
        self.entities
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| EntityError::NameNotFound(name.to_owned()))
    }

    /// First live entity whose hash is `hash`.
    pub fn get_entity_by_hash(&self, hash: EntityHash) -> Result<&Entity, EntityError> {
        self.entities
            .iter()
            .find(|e| e.hash() == hash)
            .ok_or(EntityError::HashNotFound(hash))
    }

    /// Remove the first entity named `name`.
    pub fn remove_entity_by_name(&mut self, name: &str) -> Result<Entity, EntityError> {
        let index = self
            .entities
            .position(|e| e.name == name)
            .ok_or_else(|| EntityError::NameNotFound(name.to_owned()))?;
        self.remove_at(index)
    }

    /// Remove the first entity whose hash is `hash`.
    pub fn remove_entity_by_hash(&mut self, hash: EntityHash) -> Result<Entity, EntityError> {
        let index = self
            .entities
            .position(|e| e.hash() == hash)
            .ok_or(EntityError::HashNotFound(hash))?;
        self.remove_at(index)
    }

    /// Remove every entity.
    ///
    /// Always removes slot 0: compaction shifts the next entity into it, so
    /// this drains the registry without skipping any entity.
    pub fn clear(&mut self) {
        let mut removed = 0usize;
        while let Ok(Some(_)) = self.entities.remove(0) {
            removed += 1;
        }
        tracing::debug!(removed, "entity registry cleared");
    }

    fn remove_at(&mut self, index: usize) -> Result<Entity, EntityError> {
        let entity = self
            .entities
            .remove(index)?
            .ok_or(SlotError::OutOfRange {
                index,
                capacity: self.entities.capacity(),
            })?;
        tracing::debug!(name = %entity.name, "entity removed");
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_lookup() {
        let mut reg = EntityRegistry::new();
        let e = reg.create_entity("box").unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get_entity_by_name("box").unwrap(), &e);
        assert_eq!(reg.get_entity_by_hash(e.hash()).unwrap(), &e);
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let reg = EntityRegistry::new();
        assert!(matches!(
            reg.get_entity_by_name("ghost"),
            Err(EntityError::NameNotFound(n)) if n == "ghost"
        ));
        assert!(matches!(
            reg.get_entity_by_hash(EntityHash(3)),
            Err(EntityError::HashNotFound(EntityHash(3)))
        ));
    }

    #[test]
    fn remove_by_name_keeps_order_of_rest() {
        let mut reg = EntityRegistry::new();
        for name in ["a", "b", "c"] {
            reg.create_entity(name).unwrap();
        }
        let removed = reg.remove_entity_by_name("b").unwrap();
        assert_eq!(removed.name, "b");
        let names: Vec<&str> = reg.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(reg.remove_entity_by_name("b").is_err());
    }

    #[test]
    fn remove_by_hash_takes_first_match_only() {
        let mut reg = EntityRegistry::new();
        reg.create_entity("twin").unwrap();
        reg.create_entity("other").unwrap();
        reg.create_entity("twin").unwrap();
        let hash = EntityHash::of_name("twin");
        reg.remove_entity_by_hash(hash).unwrap();
        let names: Vec<&str> = reg.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["other", "twin"]);
    }

    #[test]
    fn full_registry_reports_capacity() {
        let mut reg = EntityRegistry::with_capacity(1);
        reg.create_entity("one").unwrap();
        assert!(matches!(
            reg.create_entity("two"),
            Err(EntityError::Slot(SlotError::CapacityExceeded { capacity: 1 }))
        ));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn clear_drains_every_entity() {
        let mut reg = EntityRegistry::with_capacity(16);
        for i in 0..16 {
            reg.create_entity(format!("e{i}")).unwrap();
        }
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }
}
