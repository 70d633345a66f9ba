// src/contracts/entity_registry.rs
//! Identity → role table.
//!
//! Plain data structure; authorization, locking and event emission are the
//! job of [`crate::contracts::cold_chain::ColdChain`].

use crate::error::RegistryError;
use crate::models::entity::{Entity, Identity, Role};
use std::collections::HashMap;

/// Registered entities keyed by identity.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<Identity, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        EntityRegistry {
            entities: HashMap::new(),
        }
    }

    /// Stores a new entity.
    ///
    /// # Errors
    /// `DuplicateEntity` if the identity is already registered; the stored
    /// entity is left unchanged.
    pub fn insert(&mut self, entity: Entity) -> Result<Entity, RegistryError> {
        if self.entities.contains_key(&entity.id) {
            return Err(RegistryError::DuplicateEntity(entity.id));
        }
        self.entities.insert(entity.id, entity);
        Ok(entity)
    }

    pub fn get(&self, id: &Identity) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Like [`EntityRegistry::get`] but absence is an `UnknownEntity` error.
    pub fn resolve(&self, id: &Identity) -> Result<&Entity, RegistryError> {
        self.entities
            .get(id)
            .ok_or(RegistryError::UnknownEntity(*id))
    }

    /// Resolves `id` and requires it to hold `mode`.
    pub fn resolve_with_mode(&self, id: &Identity, mode: Role) -> Result<&Entity, RegistryError> {
        let entity = self.resolve(id)?;
        entity.require_mode(mode)?;
        Ok(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
