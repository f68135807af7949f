//! Entity registry: bidirectional name ↔ ID mapping plus declared roles.
//!
//! Registration is idempotent: declaring an entity that already exists only
//! adds the new role. IDs that were never allocated here (for example ones a
//! bulk importer made up) are adopted on first use as anonymous entities.

use std::collections::HashMap;

use crate::entity::{EntityAllocator, EntityId, EntityMeta, EntityRole};
use crate::error::{EntityError, TaxoResult};

/// Registry mapping IDs to metadata and names to IDs.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    /// Forward map: EntityId → EntityMeta (source of truth).
    id_to_meta: HashMap<EntityId, EntityMeta>,
    /// Reverse map: name → EntityId. Names are case-sensitive IRIs.
    name_to_id: HashMap<String, EntityId>,
    allocator: EntityAllocator,
}

impl EntityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name` and give it `role`, allocating an ID on first sight.
    pub fn declare_named(&mut self, name: &str, role: EntityRole) -> TaxoResult<EntityId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EntityError::EmptyName.into());
        }
        let id = match self.name_to_id.get(name) {
            Some(&id) => id,
            None => {
                let id = self.allocator.next_id()?;
                self.name_to_id.insert(name.to_string(), id);
                self.id_to_meta.insert(id, EntityMeta::named(id, name));
                tracing::trace!(%id, name, "interned entity");
                id
            }
        };
        self.add_role(id, role);
        Ok(id)
    }

    /// Allocate a fresh anonymous entity with `role`.
    pub fn declare_anonymous(&mut self, role: EntityRole) -> TaxoResult<EntityId> {
        let id = self.allocator.next_id()?;
        let mut meta = EntityMeta::anonymous(id);
        meta.roles.insert(role);
        self.id_to_meta.insert(id, meta);
        Ok(id)
    }

    /// Adopt an entity from a snapshot, keeping its ID, name and roles.
    ///
    /// Adopting an entity that is already registered under the same ID merges
    /// the roles. A name bound to a different ID, or an ID already carrying a
    /// different name, is a [`EntityError::NameConflict`].
    pub fn adopt(&mut self, meta: &EntityMeta) -> TaxoResult<()> {
        if let Some(name) = &meta.name {
            let bound = self.name_to_id.get(name).copied().filter(|&id| id != meta.id);
            let current = self
                .id_to_meta
                .get(&meta.id)
                .and_then(|m| m.name.clone())
                .filter(|current| current != name);
            let existing = bound.map(|id| id.to_string()).or(current);
            if let Some(existing) = existing {
                return Err(EntityError::NameConflict {
                    id: meta.id.to_string(),
                    name: name.clone(),
                    existing,
                }
                .into());
            }
        }

        self.allocator.reserve(meta.id);
        let entry = self
            .id_to_meta
            .entry(meta.id)
            .or_insert_with(|| EntityMeta::anonymous(meta.id));
        entry.roles.extend(meta.roles.iter().copied());
        if let Some(name) = &meta.name {
            entry.name = Some(name.clone());
            self.name_to_id.insert(name.clone(), meta.id);
        }
        tracing::trace!(id = %meta.id, name = ?meta.name, "adopted entity");
        Ok(())
    }

    /// Give `id` the `role`, adopting unknown IDs as anonymous entities.
    pub fn ensure(&mut self, id: EntityId, role: EntityRole) {
        if !self.id_to_meta.contains_key(&id) {
            self.allocator.reserve(id);
            self.id_to_meta.insert(id, EntityMeta::anonymous(id));
        }
        self.add_role(id, role);
    }

    fn add_role(&mut self, id: EntityId, role: EntityRole) {
        if let Some(meta) = self.id_to_meta.get_mut(&id) {
            meta.roles.insert(role);
        }
    }

    /// Look up entity metadata by ID.
    pub fn get(&self, id: EntityId) -> Option<&EntityMeta> {
        self.id_to_meta.get(&id)
    }

    /// Look up an entity ID by name.
    pub fn lookup(&self, name: &str) -> Option<EntityId> {
        self.name_to_id.get(name.trim()).copied()
    }

    /// Look up an entity ID by name, failing for unknown names.
    pub fn require(&self, name: &str) -> TaxoResult<EntityId> {
        self.lookup(name).ok_or_else(|| {
            EntityError::UnknownName {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Whether `id` is registered with `role`.
    pub fn has_role(&self, id: EntityId, role: EntityRole) -> bool {
        self.get(id).is_some_and(|m| m.has_role(role))
    }

    /// All entity IDs holding `role`.
    pub fn with_role(&self, role: EntityRole) -> Vec<EntityId> {
        self.id_to_meta
            .values()
            .filter(|m| m.has_role(role))
            .map(|m| m.id)
            .collect()
    }

    /// Return all registered entities.
    pub fn all(&self) -> Vec<EntityMeta> {
        self.id_to_meta.values().cloned().collect()
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.id_to_meta.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.id_to_meta.is_empty()
    }

    /// Resolve an ID to a human-readable name, falling back to the raw ID.
    pub fn display_name(&self, id: EntityId) -> String {
        self.get(id)
            .map(EntityMeta::display_name)
            .unwrap_or_else(|| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_named_is_idempotent_and_accumulates_roles() {
        let mut reg = EntityRegistry::new();
        let a = reg.declare_named("ex:Animal", EntityRole::Class).unwrap();
        let again = reg.declare_named("ex:Animal", EntityRole::Concept).unwrap();
        assert_eq!(a, again);
        assert_eq!(reg.len(), 1);
        assert!(reg.has_role(a, EntityRole::Class));
        assert!(reg.has_role(a, EntityRole::Concept));
        assert!(!reg.has_role(a, EntityRole::Property));
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut reg = EntityRegistry::new();
        let upper = reg.declare_named("ex:A", EntityRole::Class).unwrap();
        let lower = reg.declare_named("ex:a", EntityRole::Class).unwrap();
        assert_ne!(upper, lower);
        assert_eq!(reg.lookup("ex:A"), Some(upper));
        assert!(reg.lookup("ex:B").is_none());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut reg = EntityRegistry::new();
        assert!(reg.declare_named("   ", EntityRole::Class).is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn ensure_adopts_foreign_ids_without_collisions() {
        let mut reg = EntityRegistry::new();
        let foreign = EntityId::new(5).unwrap();
        reg.ensure(foreign, EntityRole::Concept);
        assert!(reg.has_role(foreign, EntityRole::Concept));
        let fresh = reg.declare_anonymous(EntityRole::Class).unwrap();
        assert!(fresh.get() > 5);
        assert_eq!(reg.display_name(foreign), "_:b5");
    }

    #[test]
    fn adopt_keeps_snapshot_ids_and_names() {
        let mut reg = EntityRegistry::new();
        let id = EntityId::new(40).unwrap();
        let mut meta = EntityMeta::named(id, "ex:Dog");
        meta.roles.insert(EntityRole::Class);
        reg.adopt(&meta).unwrap();
        reg.adopt(&meta).unwrap();

        assert_eq!(reg.lookup("ex:Dog"), Some(id));
        assert!(reg.has_role(id, EntityRole::Class));
        assert_eq!(reg.len(), 1);
        // Interning the same name reuses the adopted ID.
        assert_eq!(reg.declare_named("ex:Dog", EntityRole::Concept).unwrap(), id);
        assert!(reg.declare_named("ex:Cat", EntityRole::Class).unwrap().get() > 40);
    }

    #[test]
    fn adopt_rejects_rebinding_a_name() {
        let mut reg = EntityRegistry::new();
        let dog = reg.declare_named("ex:Dog", EntityRole::Class).unwrap();
        let other = EntityId::new(dog.get() + 10).unwrap();
        assert!(reg.adopt(&EntityMeta::named(other, "ex:Dog")).is_err());
        assert!(reg.adopt(&EntityMeta::named(dog, "ex:Hound")).is_err());
        assert_eq!(reg.lookup("ex:Dog"), Some(dog));
        assert!(reg.lookup("ex:Hound").is_none());
    }

    #[test]
    fn require_reports_unknown_names() {
        let reg = EntityRegistry::new();
        assert!(reg.require("ex:Missing").is_err());
    }
}
