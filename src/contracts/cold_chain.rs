// src/contracts/cold_chain.rs
//! The cold-chain registry.
//!
//! Combines the entity table, the batch table, the certificate ledger and
//! the event log behind a single `tokio::sync::RwLock`:
//!
//! - Mutations take the write side. Validation, id allocation, the record
//!   write and the event append all happen inside one critical section, so
//!   an operation either commits completely (record + event) or not at all.
//! - Lookups take the read side and may run concurrently with each other.
//!
//! Tokio's lock is FIFO-fair, so a queued writer is never starved by a
//! stream of readers and vice versa.
//!
//! Privileged operations take the caller's identity explicitly and compare
//! it against the owner fixed at construction.

use crate::contracts::batch_registry::VaccineBatchRegistry;
use crate::contracts::certificate_ledger::CertificateLedger;
use crate::contracts::entity_registry::EntityRegistry;
use crate::contracts::event_log::{Event, EventLog, RecordedEvent};
use crate::error::RegistryError;
use crate::models::certificate::{
    Certificate, CertificateClaim, CertificateId, CertificateSignature,
};
use crate::models::entity::{Entity, Identity, Role};
use crate::models::vaccine_batch::{BatchId, VaccineBatch};
use crate::services::verifier::{EcdsaVerifier, IdentityVerifier};
use log::{debug, info};
use tokio::sync::{broadcast, RwLock};

/// Default live-feed buffer for event subscribers.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
struct LedgerState {
    entities: EntityRegistry,
    batches: VaccineBatchRegistry,
    certificates: CertificateLedger,
    events: EventLog,
}

/// Role-gated registry of entities, vaccine batches and certificates.
///
/// # Type Parameters
/// * `V` - signature verifier; [`EcdsaVerifier`] in production
pub struct ColdChain<V = EcdsaVerifier> {
    owner: Identity,
    verifier: V,
    state: RwLock<LedgerState>,
}

impl ColdChain<EcdsaVerifier> {
    /// Registry owned by `owner`, verifying secp256k1 `eth_sign` signatures.
    pub fn new(owner: Identity) -> Self {
        Self::with_verifier(owner, EcdsaVerifier, DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}

impl<V: IdentityVerifier> ColdChain<V> {
    /// Registry with an injected verifier and event feed capacity.
    pub fn with_verifier(owner: Identity, verifier: V, event_channel_capacity: usize) -> Self {
        ColdChain {
            owner,
            verifier,
            state: RwLock::new(LedgerState {
                entities: EntityRegistry::new(),
                batches: VaccineBatchRegistry::new(),
                certificates: CertificateLedger::new(),
                events: EventLog::new(event_channel_capacity),
            }),
        }
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    fn require_owner(&self, caller: &Identity, action: &'static str) -> Result<(), RegistryError> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized {
                caller: *caller,
                action,
            })
        }
    }

    // =====================
    // Mutations
    // =====================

    /// Registers an entity with an exclusive role.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `DuplicateEntity` if `id` is already registered
    ///
    /// # Events
    /// `AddEntity { entityId, entityMode }`
    pub async fn add_entity(
        &self,
        caller: &Identity,
        id: Identity,
        mode: Role,
    ) -> Result<Entity, RegistryError> {
        let result: Result<Entity, RegistryError> = async {
            self.require_owner(caller, "register entities")?;
            let mut state = self.state.write().await;
            let entity = state.entities.insert(Entity::new(id, mode))?;
            state.events.append(Event::AddEntity {
                entity_id: id,
                entity_mode: mode,
            });
            Ok(entity)
        }
        .await;

        match &result {
            Ok(entity) => info!("registered entity {} as {}", entity.id, entity.mode),
            Err(e) => debug!("addEntity({id}, {mode}) rejected: {e}"),
        }
        result
    }

    /// Records a vaccine batch made by a registered PROVER.
    ///
    /// # Returns
    /// The new batch id; ids start at 0 and follow call order.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `UnknownEntity` if `manufacturer` is not registered
    /// - `RoleMismatch` if `manufacturer` is not a PROVER
    ///
    /// # Events
    /// `AddVaccineBatch { vaccineBatchId, manufacturer }`
    pub async fn add_vaccine_batch(
        &self,
        caller: &Identity,
        brand: impl Into<String>,
        manufacturer: Identity,
    ) -> Result<BatchId, RegistryError> {
        let brand = brand.into();
        let result: Result<BatchId, RegistryError> = async {
            self.require_owner(caller, "add vaccine batches")?;
            let mut state = self.state.write().await;
            let LedgerState {
                entities,
                batches,
                events,
                ..
            } = &mut *state;
            let id = batches.append(entities, brand.clone(), manufacturer)?.id;
            events.append(Event::AddVaccineBatch {
                vaccine_batch_id: id,
                manufacturer,
            });
            Ok(id)
        }
        .await;

        match &result {
            Ok(id) => info!("added vaccine batch #{id} ({brand}) for {manufacturer}"),
            Err(e) => debug!("addVaccineBatch({brand:?}, {manufacturer}) rejected: {e}"),
        }
        result
    }

    /// Issues a certificate binding `issuer` to `prover`.
    ///
    /// `signature` must be the issuer's signature over the plain canonical
    /// message for `(issuer, prover)`; see [`CertificateClaim::new`].
    /// Signatures over the `vaccine batch #<id>` message do not verify here
    /// and must go through [`ColdChain::issue_batch_certificate`].
    ///
    /// # Errors
    /// - `Unauthorized` unless `caller` is the issuer itself or the owner
    /// - `UnknownEntity`, then `RoleMismatch`, for issuer and prover
    /// - `DuplicateCertificate` if the claim is already on the ledger,
    ///   including when that certificate was revoked
    /// - `InvalidSignature` if the signature does not verify
    ///
    /// # Events
    /// `IssueCertificate { issuer, prover }`
    pub async fn issue_certificate(
        &self,
        caller: &Identity,
        issuer: Identity,
        prover: Identity,
        signature: CertificateSignature,
    ) -> Result<CertificateId, RegistryError> {
        self.issue(caller, CertificateClaim::new(issuer, prover), signature)
            .await
    }

    /// Issues a certificate scoped to one of the prover's batches.
    ///
    /// Same rules as [`ColdChain::issue_certificate`], plus `UnknownBatch`
    /// and `BatchManufacturerMismatch`. The signature covers the
    /// batch-scoped canonical message.
    pub async fn issue_batch_certificate(
        &self,
        caller: &Identity,
        issuer: Identity,
        prover: Identity,
        batch: BatchId,
        signature: CertificateSignature,
    ) -> Result<CertificateId, RegistryError> {
        self.issue(caller, CertificateClaim::for_batch(issuer, prover, batch), signature)
            .await
    }

    async fn issue(
        &self,
        caller: &Identity,
        claim: CertificateClaim,
        signature: CertificateSignature,
    ) -> Result<CertificateId, RegistryError> {
        let result: Result<CertificateId, RegistryError> = async {
            if *caller != claim.issuer && *caller != self.owner {
                return Err(RegistryError::Unauthorized {
                    caller: *caller,
                    action: "issue certificates on behalf of another issuer",
                });
            }
            let mut state = self.state.write().await;
            let LedgerState {
                entities,
                batches,
                certificates,
                events,
            } = &mut *state;
            let id = certificates
                .admit(entities, batches, &self.verifier, claim, signature)?
                .id;
            events.append(Event::IssueCertificate {
                issuer: claim.issuer,
                prover: claim.prover,
            });
            Ok(id)
        }
        .await;

        match &result {
            Ok(id) => info!("issued certificate #{id}: {}", claim.message()),
            Err(e) => debug!("issueCertificate({}) rejected: {e}", claim.message()),
        }
        result
    }

    /// Revokes an issued certificate. The record stays readable with a
    /// revoked status, and its claim cannot be issued again.
    ///
    /// The certificate is looked up before the caller is authorized, since
    /// authorization depends on its issuer. Any caller can therefore tell a
    /// missing id (`UnknownCertificate`) from an existing one
    /// (`Unauthorized`); ids are sequential and public through
    /// [`ColdChain::get_certificate`] anyway.
    ///
    /// # Errors
    /// - `UnknownCertificate` if no such certificate exists, checked first
    /// - `Unauthorized` unless `caller` is the owner or the certificate's issuer
    /// - `AlreadyRevoked` if it was revoked before
    ///
    /// # Events
    /// `RevokeCertificate { certificateId, revokedBy }`
    pub async fn revoke_certificate(
        &self,
        caller: &Identity,
        id: CertificateId,
    ) -> Result<Certificate, RegistryError> {
        let result: Result<Certificate, RegistryError> = async {
            let mut state = self.state.write().await;
            let issuer = state
                .certificates
                .get(id)
                .map(|c| c.issuer)
                .ok_or(RegistryError::UnknownCertificate(id))?;
            if *caller != issuer && *caller != self.owner {
                return Err(RegistryError::Unauthorized {
                    caller: *caller,
                    action: "revoke another issuer's certificate",
                });
            }
            let certificate = state.certificates.revoke(id, *caller)?.clone();
            state.events.append(Event::RevokeCertificate {
                certificate_id: id,
                revoked_by: *caller,
            });
            Ok(certificate)
        }
        .await;

        match &result {
            Ok(_) => info!("revoked certificate #{id} by {caller}"),
            Err(e) => debug!("revokeCertificate(#{id}) rejected: {e}"),
        }
        result
    }

    // =====================
    // Lookups
    // =====================

    pub async fn get_entity(&self, id: &Identity) -> Option<Entity> {
        self.state.read().await.entities.get(id).copied()
    }

    pub async fn get_batch(&self, id: BatchId) -> Option<VaccineBatch> {
        self.state.read().await.batches.get(id).cloned()
    }

    /// Returns the stored certificate, revoked or not. Does not re-verify.
    pub async fn get_certificate(&self, id: CertificateId) -> Option<Certificate> {
        self.state.read().await.certificates.get(id).cloned()
    }

    /// `true` iff the certificate exists, is not revoked and its signature
    /// still verifies against its canonical claim.
    pub async fn is_certificate_valid(&self, id: CertificateId) -> bool {
        match self.get_certificate(id).await {
            Some(certificate) => {
                !certificate.is_revoked() && self.verifier.verify_certificate(&certificate)
            }
            None => false,
        }
    }

    pub async fn entity_count(&self) -> usize {
        self.state.read().await.entities.len()
    }

    pub async fn batch_count(&self) -> usize {
        self.state.read().await.batches.len()
    }

    pub async fn certificate_count(&self) -> usize {
        self.state.read().await.certificates.len()
    }

    /// Snapshot of every event committed so far, in commit order.
    pub async fn events(&self) -> Vec<RecordedEvent> {
        self.state.read().await.events.events().to_vec()
    }

    /// Live feed of events committed after this call returns.
    pub async fn subscribe(&self) -> broadcast::Receiver<RecordedEvent> {
        self.state.read().await.events.subscribe()
    }
}
