// src/contracts/batch_registry.rs
//! Sequentially numbered vaccine batches.

use crate::contracts::entity_registry::EntityRegistry;
use crate::error::RegistryError;
use crate::models::entity::{Identity, Role};
use crate::models::vaccine_batch::{BatchId, VaccineBatch};

/// Append-only batch table. A batch's id is its position, so ids are
/// gap-free and never reused.
#[derive(Debug, Default)]
pub struct VaccineBatchRegistry {
    batches: Vec<VaccineBatch>,
}

impl VaccineBatchRegistry {
    pub fn new() -> Self {
        VaccineBatchRegistry {
            batches: Vec::new(),
        }
    }

    /// Id the next appended batch will receive.
    pub fn next_id(&self) -> BatchId {
        self.batches.len() as BatchId
    }

    /// Validates the manufacturer and appends a batch.
    ///
    /// # Errors
    /// - `UnknownEntity` if `manufacturer` is not registered
    /// - `RoleMismatch` if it is registered but not a PROVER
    ///
    /// Nothing is appended on error.
    pub fn append(
        &mut self,
        entities: &EntityRegistry,
        brand: String,
        manufacturer: Identity,
    ) -> Result<&VaccineBatch, RegistryError> {
        entities.resolve_with_mode(&manufacturer, Role::Prover)?;
        let id = self.next_id();
        self.batches.push(VaccineBatch {
            id,
            brand,
            manufacturer,
        });
        Ok(&self.batches[self.batches.len() - 1])
    }

    pub fn get(&self, id: BatchId) -> Option<&VaccineBatch> {
        usize::try_from(id).ok().and_then(|index| self.batches.get(index))
    }

    /// Like [`VaccineBatchRegistry::get`] but absence is an `UnknownBatch` error.
    pub fn resolve(&self, id: BatchId) -> Result<&VaccineBatch, RegistryError> {
        self.get(id).ok_or(RegistryError::UnknownBatch(id))
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::Entity;

    fn entities() -> (EntityRegistry, Identity, Identity) {
        let mut entities = EntityRegistry::new();
        let prover = Identity::from_bytes([1; 20]);
        let verifier = Identity::from_bytes([2; 20]);
        entities.insert(Entity::new(prover, Role::Prover)).unwrap();
        entities.insert(Entity::new(verifier, Role::Verifier)).unwrap();
        (entities, prover, verifier)
    }

    #[test]
    fn test_ids_follow_append_order() {
        let (entities, prover, _) = entities();
        let mut batches = VaccineBatchRegistry::new();
        for expected in 0..5u64 {
            let batch = batches.append(&entities, format!("brand-{expected}"), prover).unwrap();
            assert_eq!(batch.id, expected);
        }
        assert_eq!(batches.get(3).map(|b| b.brand.as_str()), Some("brand-3"));
        assert!(batches.get(5).is_none());
        assert!(batches.get(u64::MAX).is_none());
    }

    #[test]
    fn test_rejected_manufacturer_consumes_no_id() {
        let (entities, prover, verifier) = entities();
        let mut batches = VaccineBatchRegistry::new();

        assert!(matches!(
            batches.append(&entities, "Moderna".into(), verifier),
            Err(RegistryError::RoleMismatch { .. })
        ));
        let stranger = Identity::from_bytes([9; 20]);
        assert_eq!(
            batches.append(&entities, "Moderna".into(), stranger).err(),
            Some(RegistryError::UnknownEntity(stranger))
        );
        assert!(batches.is_empty());
        assert_eq!(batches.append(&entities, "Moderna".into(), prover).unwrap().id, 0);
    }

    #[test]
    fn test_resolve_unknown_batch() {
        let batches = VaccineBatchRegistry::new();
        assert_eq!(batches.resolve(0).err(), Some(RegistryError::UnknownBatch(0)));
    }
}
