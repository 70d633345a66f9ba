// src/services/verifier.rs
//! Signature verification for certificate claims.
//!
//! The registry never talks to a curve library directly; it is handed an
//! [`IdentityVerifier`]. Production code wires [`EcdsaVerifier`], tests can
//! substitute a deterministic fake.

use crate::models::certificate::{Certificate, CertificateSignature};
use crate::models::entity::Identity;
use crate::utils::crypto::{address_from_verifying_key, eth_signed_prehash};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

/// Decides whether a signature over a digest was produced by a given identity.
///
/// Implementations must be pure: same inputs, same answer, no side effects.
pub trait IdentityVerifier: Send + Sync {
    /// Returns `true` iff `signature` over `digest` was produced by the key
    /// behind `claimed_signer`.
    fn verify(
        &self,
        digest: &[u8; 32],
        signature: &CertificateSignature,
        claimed_signer: &Identity,
    ) -> bool;

    /// Re-checks a stored certificate against its own canonical claim.
    fn verify_certificate(&self, certificate: &Certificate) -> bool {
        self.verify(
            &certificate.claim().digest(),
            &certificate.signature,
            &certificate.issuer,
        )
    }
}

/// secp256k1 public-key recovery over `eth_sign` prehashes.
///
/// Accepts 65-byte `r || s || v` signatures with `v` in {0, 1, 27, 28}.
/// High-S signatures are rejected by the recovery step.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

impl EcdsaVerifier {
    /// Recovers the signing identity, if the signature is well formed.
    pub fn recover(&self, digest: &[u8; 32], signature: &CertificateSignature) -> Option<Identity> {
        let bytes = signature.as_bytes();
        if bytes.len() != 65 {
            return None;
        }
        let v = match bytes[64] {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - 27,
            _ => return None,
        };
        let recovery_id = RecoveryId::from_byte(v)?;
        let signature = Signature::from_slice(&bytes[..64]).ok()?;
        let prehash = eth_signed_prehash(digest);
        let key = VerifyingKey::recover_from_prehash(&prehash, &signature, recovery_id).ok()?;
        Some(Identity::new(address_from_verifying_key(&key)))
    }
}

impl IdentityVerifier for EcdsaVerifier {
    fn verify(
        &self,
        digest: &[u8; 32],
        signature: &CertificateSignature,
        claimed_signer: &Identity,
    ) -> bool {
        // Full 20-byte equality, never a prefix match.
        match self.recover(digest, signature) {
            Some(recovered) => recovered.as_bytes() == claimed_signer.as_bytes(),
            None => false,
        }
    }
}
