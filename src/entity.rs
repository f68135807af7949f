//! Core entity types for the taxonomia engine.
//!
//! Every class, concept and property is identified by an [`EntityId`]. Entities
//! carry no engine-managed state beyond the roles they have been declared in;
//! identity is by value. The [`EntityAllocator`] hands out fresh identifiers.

use std::collections::BTreeSet;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::error::{EntityError, TaxoResult};

/// Opaque, niche-optimized identifier for an entity.
///
/// Uses `NonZeroU64` so that `Option<EntityId>` is the same size as `EntityId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    /// Create an `EntityId` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(EntityId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ent:{}", self.0)
    }
}

/// Taxonomy an entity takes part in. One entity may hold several roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityRole {
    /// An ontology class.
    Class,
    /// A controlled-vocabulary concept.
    Concept,
    /// A property with domain and range.
    Property,
}

impl std::fmt::Display for EntityRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRole::Class => write!(f, "class"),
            EntityRole::Concept => write!(f, "concept"),
            EntityRole::Property => write!(f, "property"),
        }
    }
}

/// Metadata describing an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Unique identifier.
    pub id: EntityId,
    /// IRI or CURIE, `None` for anonymous entities.
    pub name: Option<String>,
    /// Every role this entity has been declared in.
    pub roles: BTreeSet<EntityRole>,
}

impl EntityMeta {
    /// A named entity without roles.
    pub fn named(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            roles: BTreeSet::new(),
        }
    }

    /// An anonymous entity without roles.
    pub fn anonymous(id: EntityId) -> Self {
        Self {
            id,
            name: None,
            roles: BTreeSet::new(),
        }
    }

    /// Whether the entity was declared in `role`.
    pub fn has_role(&self, role: EntityRole) -> bool {
        self.roles.contains(&role)
    }

    /// Human-readable label: the name, or `_:b{id}` for anonymous entities.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("_:b{}", self.id.get()),
        }
    }
}

/// Sequential entity ID allocator.
///
/// Produces monotonically increasing IDs starting from 1.
#[derive(Debug)]
pub struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    /// Create a new allocator that starts from ID 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next entity ID.
    pub fn next_id(&mut self) -> TaxoResult<EntityId> {
        let id = EntityId::new(self.next).ok_or(EntityError::AllocatorExhausted)?;
        self.next = self
            .next
            .checked_add(1)
            .ok_or(EntityError::AllocatorExhausted)?;
        Ok(id)
    }

    /// Make sure `id` will never be handed out again.
    pub fn reserve(&mut self, id: EntityId) {
        if id.get() >= self.next {
            self.next = id.get().saturating_add(1);
        }
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_niche_optimization() {
        assert_eq!(
            std::mem::size_of::<Option<EntityId>>(),
            std::mem::size_of::<EntityId>()
        );
    }

    #[test]
    fn entity_id_zero_is_none() {
        assert!(EntityId::new(0).is_none());
        assert_eq!(EntityId::new(42).unwrap().get(), 42);
    }

    #[test]
    fn allocator_produces_sequential_ids() {
        let mut alloc = EntityAllocator::new();
        assert_eq!(alloc.next_id().unwrap().get(), 1);
        assert_eq!(alloc.next_id().unwrap().get(), 2);
    }

    #[test]
    fn allocator_reserve_skips_foreign_ids() {
        let mut alloc = EntityAllocator::new();
        alloc.reserve(EntityId::new(9).unwrap());
        assert_eq!(alloc.next_id().unwrap().get(), 10);
        alloc.reserve(EntityId::new(3).unwrap());
        assert_eq!(alloc.next_id().unwrap().get(), 11);
    }

    #[test]
    fn display_name_for_anonymous() {
        let meta = EntityMeta::anonymous(EntityId::new(7).unwrap());
        assert_eq!(meta.display_name(), "_:b7");
        let named = EntityMeta::named(EntityId::new(8).unwrap(), "ex:Animal");
        assert_eq!(named.display_name(), "ex:Animal");
    }
}
