// src/models/certificate.rs
//! Inspection certificates and the canonical claim they sign.
//!
//! A certificate binds an ISSUER to a PROVER (optionally to one of the
//! prover's batches) through a signature over a canonical message. The
//! message text is a protocol detail: signers and verifiers must
//! produce it byte-for-byte identically, so it is built in exactly one place,
//! [`CertificateClaim::message`].

use crate::error::ParseError;
use crate::models::entity::Identity;
use crate::models::vaccine_batch::BatchId;
use crate::utils::crypto::hash_data;
use ethers_core::utils::hex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sequential certificate identifier, assigned by the ledger starting at 0.
pub type CertificateId = u64;

/// The statement an issuer signs.
///
/// # Message Layout
/// - batch-scoped: `Inspector <issuer> has certified vaccine batch #<id> for manufacturer <prover>`
/// - plain: `Inspector <issuer> has certified manufacturer <prover>`
///
/// Addresses are rendered EIP-55 checksummed, the batch id in decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertificateClaim {
    pub issuer: Identity,
    pub prover: Identity,
    pub batch: Option<BatchId>,
}

impl CertificateClaim {
    /// Claim about a prover as a whole.
    pub fn new(issuer: Identity, prover: Identity) -> Self {
        CertificateClaim {
            issuer,
            prover,
            batch: None,
        }
    }

    /// Claim scoped to one of the prover's batches.
    pub fn for_batch(issuer: Identity, prover: Identity, batch: BatchId) -> Self {
        CertificateClaim {
            issuer,
            prover,
            batch: Some(batch),
        }
    }

    /// Canonical message text.
    pub fn message(&self) -> String {
        match self.batch {
            Some(batch) => format!(
                "Inspector {} has certified vaccine batch #{} for manufacturer {}",
                self.issuer, batch, self.prover
            ),
            None => format!(
                "Inspector {} has certified manufacturer {}",
                self.issuer, self.prover
            ),
        }
    }

    /// Keccak-256 digest of the canonical message. This is what gets signed.
    pub fn digest(&self) -> [u8; 32] {
        hash_data(self.message().as_bytes())
    }
}

/// Raw signature bytes as presented by the issuer.
///
/// Stored verbatim so that a read returns exactly what was submitted.
/// The expected layout is 65 bytes `r || s || v`; anything else simply
/// fails verification.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CertificateSignature(Vec<u8>);

impl CertificateSignature {
    pub fn new(bytes: Vec<u8>) -> Self {
        CertificateSignature(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for CertificateSignature {
    fn from(bytes: Vec<u8>) -> Self {
        CertificateSignature(bytes)
    }
}

impl FromStr for CertificateSignature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        hex::decode(digits)
            .map(CertificateSignature)
            .map_err(|e| ParseError::InvalidSignatureEncoding(e.to_string()))
    }
}

impl fmt::Debug for CertificateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateSignature({})", self.to_hex())
    }
}

impl Serialize for CertificateSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CertificateSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of a stored certificate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum CertificateStatus {
    Issued,
    Revoked { revoked_by: Identity },
}

/// A certificate admitted to the ledger.
///
/// Its signature verified against `claim()` when it was written. Reads do
/// not re-verify; use [`crate::services::verifier::IdentityVerifier`] to
/// confirm it independently.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub id: CertificateId,
    pub issuer: Identity,
    pub prover: Identity,

    /// Batch the certificate is scoped to, if issued in batch form
    pub batch: Option<BatchId>,

    pub signature: CertificateSignature,
    pub status: CertificateStatus,
}

impl Certificate {
    /// The claim this certificate's signature covers.
    pub fn claim(&self) -> CertificateClaim {
        CertificateClaim {
            issuer: self.issuer,
            prover: self.prover,
            batch: self.batch,
        }
    }

    pub fn is_revoked(&self) -> bool {
        matches!(self.status, CertificateStatus::Revoked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspector() -> Identity {
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap()
    }

    fn manufacturer() -> Identity {
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359".parse().unwrap()
    }

    #[test]
    fn test_batch_message_matches_inspection_wording() {
        let claim = CertificateClaim::for_batch(inspector(), manufacturer(), 0);
        assert_eq!(
            claim.message(),
            "Inspector 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed has certified vaccine batch #0 \
             for manufacturer 0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }

    #[test]
    fn test_plain_message() {
        let claim = CertificateClaim::new(inspector(), manufacturer());
        assert_eq!(
            claim.message(),
            "Inspector 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed has certified manufacturer \
             0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }

    #[test]
    fn test_distinct_claims_have_distinct_digests() {
        let plain = CertificateClaim::new(inspector(), manufacturer());
        let swapped = CertificateClaim::new(manufacturer(), inspector());
        let batch0 = CertificateClaim::for_batch(inspector(), manufacturer(), 0);
        let batch1 = CertificateClaim::for_batch(inspector(), manufacturer(), 1);

        let digests = [plain.digest(), swapped.digest(), batch0.digest(), batch1.digest()];
        for (i, a) in digests.iter().enumerate() {
            for b in &digests[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(plain.digest(), CertificateClaim::new(inspector(), manufacturer()).digest());
    }

    #[test]
    fn test_signature_hex_parsing() {
        let sig: CertificateSignature = "0x0a0B0c".parse().unwrap();
        assert_eq!(sig.as_bytes(), &[0x0a, 0x0b, 0x0c]);
        assert_eq!(sig.to_hex(), "0x0a0b0c");
        assert!("0xabc".parse::<CertificateSignature>().is_err());
        assert!("nothex".parse::<CertificateSignature>().is_err());
    }

    #[test]
    fn test_certificate_serializes_status_flag() {
        let cert = Certificate {
            id: 3,
            issuer: inspector(),
            prover: manufacturer(),
            batch: Some(2),
            signature: CertificateSignature::new(vec![1, 2]),
            status: CertificateStatus::Revoked {
                revoked_by: inspector(),
            },
        };
        let value = serde_json::to_value(&cert).unwrap();
        assert_eq!(value["status"]["state"], "revoked");
        assert_eq!(value["signature"], "0x0102");
        assert_eq!(value["batch"], 2);
        assert!(cert.is_revoked());
        assert_eq!(cert.claim(), CertificateClaim::for_batch(inspector(), manufacturer(), 2));
    }
}
