// src/wallet/key_management.rs
//! Issuer-side key management.
//!
//! Holds a secp256k1 key pair and signs certificate claims the same way an
//! Ethereum wallet answers `eth_sign`, so that signatures made here and
//! signatures made by an external wallet are interchangeable.
//!
//! Uses the following cryptographic primitives:
//! - secp256k1 curve (via `k256` crate)
//! - Keccak-256 hashing (via `ethers` crate)
//! - Cryptographically secure random number generation

use crate::models::certificate::{CertificateClaim, CertificateSignature};
use crate::models::entity::Identity;
use crate::utils::crypto::{address_from_verifying_key, eth_signed_prehash};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Key management for a single issuer account.
///
/// # Security Notes
/// - The secret key is never exposed or serialized
/// - Signatures are deterministic (RFC 6979) with low-S normalization
#[derive(Clone)]
pub struct KeyManager {
    signing_key: SigningKey,
    identity: Identity,
}

impl KeyManager {
    /// Generates a new KeyManager with a fresh random key.
    pub fn new() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Loads a KeyManager from a 32-byte big-endian secret scalar.
    ///
    /// # Errors
    /// Returns `KeyError::InvalidSecretKey` if the bytes are not a valid
    /// non-zero scalar below the curve order.
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_slice(secret).map_err(|e| KeyError::InvalidSecretKey(e.to_string()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let identity = Identity::new(address_from_verifying_key(signing_key.verifying_key()));
        KeyManager {
            signing_key,
            identity,
        }
    }

    /// Account address controlled by this key.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Signs a 32-byte digest the way `eth_sign` does.
    ///
    /// # Process Flow
    /// 1. Prefixes the digest with `"\x19Ethereum Signed Message:\n32"` and hashes it
    /// 2. Signs the prehash with recoverable ECDSA
    /// 3. Serializes as 65 bytes `r || s || v` with `v` in {27, 28}
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<CertificateSignature, KeyError> {
        let prehash = eth_signed_prehash(digest);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&prehash)
            .map_err(|e| KeyError::SigningFailed(e.to_string()))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(27 + recovery_id.to_byte());
        Ok(CertificateSignature::new(bytes))
    }

    /// Signs the canonical message of `claim`.
    pub fn sign_claim(&self, claim: &CertificateClaim) -> Result<CertificateSignature, KeyError> {
        self.sign_digest(&claim.digest())
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_of_known_key() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let keys = KeyManager::from_secret_bytes(&secret).unwrap();
        assert_eq!(
            keys.identity().to_string(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_rejects_zero_secret() {
        assert!(matches!(
            KeyManager::from_secret_bytes(&[0u8; 32]),
            Err(KeyError::InvalidSecretKey(_))
        ));
    }

    #[test]
    fn test_signature_layout_and_determinism() {
        let keys = KeyManager::from_secret_bytes(&[7u8; 32]).unwrap();
        let claim = CertificateClaim::new(keys.identity(), Identity::from_bytes([9; 20]));

        let first = keys.sign_claim(&claim).unwrap();
        let second = keys.sign_claim(&claim).unwrap();
        assert_eq!(first.as_bytes().len(), 65);
        assert!(matches!(first.as_bytes()[64], 27 | 28));
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_keys_differ() {
        assert_ne!(KeyManager::new().identity(), KeyManager::new().identity());
    }
}
