// src/contracts/certificate_ledger.rs
//! Append-only table of verified certificates.
//!
//! Admission runs every check before touching the table, so a rejected
//! certificate never consumes an id. A claim is admitted at most once:
//! revoking a certificate does not free its claim for a second admission.

use crate::contracts::batch_registry::VaccineBatchRegistry;
use crate::contracts::entity_registry::EntityRegistry;
use crate::error::RegistryError;
use crate::models::certificate::{
    Certificate, CertificateClaim, CertificateId, CertificateSignature, CertificateStatus,
};
use crate::models::entity::{Identity, Role};
use crate::services::verifier::IdentityVerifier;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CertificateLedger {
    certificates: Vec<Certificate>,
    // claim digest -> certificate that carries it
    claims: HashMap<[u8; 32], CertificateId>,
}

impl CertificateLedger {
    pub fn new() -> Self {
        CertificateLedger {
            certificates: Vec::new(),
            claims: HashMap::new(),
        }
    }

    /// Id the next admitted certificate will receive.
    pub fn next_id(&self) -> CertificateId {
        self.certificates.len() as CertificateId
    }

    /// Validates a claim and its signature, then appends the certificate.
    ///
    /// # Check Order
    /// 1. issuer and prover are registered (`UnknownEntity`)
    /// 2. issuer is ISSUER, prover is PROVER (`RoleMismatch`)
    /// 3. for batch claims, the batch exists (`UnknownBatch`) and was made
    ///    by the prover (`BatchManufacturerMismatch`)
    /// 4. the claim is not already on the ledger, revoked or not
    ///    (`DuplicateCertificate`)
    /// 5. the signature verifies against the canonical message (`InvalidSignature`)
    pub fn admit<V: IdentityVerifier + ?Sized>(
        &mut self,
        entities: &EntityRegistry,
        batches: &VaccineBatchRegistry,
        verifier: &V,
        claim: CertificateClaim,
        signature: CertificateSignature,
    ) -> Result<&Certificate, RegistryError> {
        let issuer = entities.resolve(&claim.issuer)?;
        let prover = entities.resolve(&claim.prover)?;
        issuer.require_mode(Role::Issuer)?;
        prover.require_mode(Role::Prover)?;

        if let Some(batch_id) = claim.batch {
            let batch = batches.resolve(batch_id)?;
            if batch.manufacturer != claim.prover {
                return Err(RegistryError::BatchManufacturerMismatch {
                    batch_id,
                    prover: claim.prover,
                });
            }
        }

        let digest = claim.digest();
        if let Some(&existing) = self.claims.get(&digest) {
            return Err(RegistryError::DuplicateCertificate(existing));
        }

        if !verifier.verify(&digest, &signature, &claim.issuer) {
            return Err(RegistryError::InvalidSignature {
                issuer: claim.issuer,
            });
        }

        let id = self.next_id();
        self.claims.insert(digest, id);
        self.certificates.push(Certificate {
            id,
            issuer: claim.issuer,
            prover: claim.prover,
            batch: claim.batch,
            signature,
            status: CertificateStatus::Issued,
        });
        Ok(&self.certificates[self.certificates.len() - 1])
    }

    /// Moves an issued certificate to the revoked state.
    ///
    /// The record stays readable; only its status changes.
    pub fn revoke(
        &mut self,
        id: CertificateId,
        revoked_by: Identity,
    ) -> Result<&Certificate, RegistryError> {
        let certificate = usize::try_from(id)
            .ok()
            .and_then(|index| self.certificates.get_mut(index))
            .ok_or(RegistryError::UnknownCertificate(id))?;
        if certificate.is_revoked() {
            return Err(RegistryError::AlreadyRevoked(id));
        }
        certificate.status = CertificateStatus::Revoked { revoked_by };
        Ok(&*certificate)
    }

    pub fn get(&self, id: CertificateId) -> Option<&Certificate> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.certificates.get(index))
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::Entity;

    struct Fixed(bool);

    impl IdentityVerifier for Fixed {
        fn verify(&self, _: &[u8; 32], _: &CertificateSignature, _: &Identity) -> bool {
            self.0
        }
    }

    struct Setup {
        entities: EntityRegistry,
        batches: VaccineBatchRegistry,
        issuer: Identity,
        prover: Identity,
        other_prover: Identity,
    }

    fn setup() -> Setup {
        let mut entities = EntityRegistry::new();
        let issuer = Identity::from_bytes([1; 20]);
        let prover = Identity::from_bytes([2; 20]);
        let other_prover = Identity::from_bytes([3; 20]);
        entities.insert(Entity::new(issuer, Role::Issuer)).unwrap();
        entities.insert(Entity::new(prover, Role::Prover)).unwrap();
        entities.insert(Entity::new(other_prover, Role::Prover)).unwrap();

        let mut batches = VaccineBatchRegistry::new();
        batches.append(&entities, "Sinovac Biotech".into(), other_prover).unwrap();
        batches.append(&entities, "Sputnik V".into(), prover).unwrap();

        Setup {
            entities,
            batches,
            issuer,
            prover,
            other_prover,
        }
    }

    fn sig() -> CertificateSignature {
        CertificateSignature::new(vec![0xaa; 65])
    }

    #[test]
    fn test_admit_assigns_sequential_ids() {
        let s = setup();
        let mut ledger = CertificateLedger::new();

        let first = ledger
            .admit(
                &s.entities,
                &s.batches,
                &Fixed(true),
                CertificateClaim::new(s.issuer, s.prover),
                sig(),
            )
            .unwrap()
            .id;
        let second = ledger
            .admit(
                &s.entities,
                &s.batches,
                &Fixed(true),
                CertificateClaim::for_batch(s.issuer, s.prover, 1),
                sig(),
            )
            .unwrap()
            .id;
        assert_eq!((first, second), (0, 1));
        assert_eq!(ledger.get(1).unwrap().status, CertificateStatus::Issued);
    }

    #[test]
    fn test_same_claim_is_admitted_once() {
        let s = setup();
        let mut ledger = CertificateLedger::new();
        let claim = CertificateClaim::new(s.issuer, s.prover);

        ledger
            .admit(&s.entities, &s.batches, &Fixed(true), claim, sig())
            .unwrap();
        assert_eq!(
            ledger
                .admit(&s.entities, &s.batches, &Fixed(true), claim, sig())
                .err(),
            Some(RegistryError::DuplicateCertificate(0))
        );

        // revocation does not release the claim
        ledger.revoke(0, s.issuer).unwrap();
        assert_eq!(
            ledger
                .admit(&s.entities, &s.batches, &Fixed(true), claim, sig())
                .err(),
            Some(RegistryError::DuplicateCertificate(0))
        );
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.next_id(), 1);
    }

    #[test]
    fn test_duplicate_checked_before_signature() {
        let s = setup();
        let mut ledger = CertificateLedger::new();
        let claim = CertificateClaim::for_batch(s.issuer, s.other_prover, 0);

        ledger
            .admit(&s.entities, &s.batches, &Fixed(true), claim, sig())
            .unwrap();
        assert_eq!(
            ledger
                .admit(&s.entities, &s.batches, &Fixed(false), claim, sig())
                .err(),
            Some(RegistryError::DuplicateCertificate(0))
        );
    }

    #[test]
    fn test_rejected_signature_leaves_claim_free() {
        let s = setup();
        let mut ledger = CertificateLedger::new();
        let claim = CertificateClaim::new(s.issuer, s.prover);

        assert!(ledger
            .admit(&s.entities, &s.batches, &Fixed(false), claim, sig())
            .is_err());
        assert_eq!(
            ledger
                .admit(&s.entities, &s.batches, &Fixed(true), claim, sig())
                .unwrap()
                .id,
            0
        );
    }

    #[test]
    fn test_unknown_checked_before_roles() {
        let s = setup();
        let mut ledger = CertificateLedger::new();
        let stranger = Identity::from_bytes([9; 20]);

        // prover is unknown and issuer has the wrong role: unknown wins
        let claim = CertificateClaim::new(s.prover, stranger);
        assert_eq!(
            ledger
                .admit(&s.entities, &s.batches, &Fixed(true), claim, sig())
                .err(),
            Some(RegistryError::UnknownEntity(stranger))
        );
    }

    #[test]
    fn test_rejected_signature_consumes_no_id() {
        let s = setup();
        let mut ledger = CertificateLedger::new();
        let claim = CertificateClaim::new(s.issuer, s.prover);

        assert_eq!(
            ledger
                .admit(&s.entities, &s.batches, &Fixed(false), claim, sig())
                .err(),
            Some(RegistryError::InvalidSignature { issuer: s.issuer })
        );
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_id(), 0);
    }

    #[test]
    fn test_batch_claims_check_manufacturer() {
        let s = setup();
        let mut ledger = CertificateLedger::new();

        let wrong = CertificateClaim::for_batch(s.issuer, s.prover, 0);
        assert_eq!(
            ledger
                .admit(&s.entities, &s.batches, &Fixed(true), wrong, sig())
                .err(),
            Some(RegistryError::BatchManufacturerMismatch {
                batch_id: 0,
                prover: s.prover
            })
        );

        let missing = CertificateClaim::for_batch(s.issuer, s.prover, 7);
        assert_eq!(
            ledger
                .admit(&s.entities, &s.batches, &Fixed(true), missing, sig())
                .err(),
            Some(RegistryError::UnknownBatch(7))
        );

        let right = CertificateClaim::for_batch(s.issuer, s.other_prover, 0);
        let cert = ledger
            .admit(&s.entities, &s.batches, &Fixed(true), right, sig())
            .unwrap();
        assert_eq!(cert.batch, Some(0));
    }

    #[test]
    fn test_revoke_transitions_once() {
        let s = setup();
        let mut ledger = CertificateLedger::new();
        ledger
            .admit(
                &s.entities,
                &s.batches,
                &Fixed(true),
                CertificateClaim::new(s.issuer, s.prover),
                sig(),
            )
            .unwrap();

        let revoked = ledger.revoke(0, s.issuer).unwrap();
        assert_eq!(
            revoked.status,
            CertificateStatus::Revoked {
                revoked_by: s.issuer
            }
        );
        assert_eq!(
            ledger.revoke(0, s.issuer).err(),
            Some(RegistryError::AlreadyRevoked(0))
        );
        assert_eq!(
            ledger.revoke(5, s.issuer).err(),
            Some(RegistryError::UnknownCertificate(5))
        );
        assert!(ledger.get(0).unwrap().is_revoked());
    }
}
