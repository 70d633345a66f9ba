// src/error.rs
//! Error types for the cold-chain registry.
//!
//! Every registry failure is a caller-side precondition violation: the
//! operation is aborted as a whole, no record is written, no id is consumed
//! and no event is emitted.

use crate::models::certificate::CertificateId;
use crate::models::entity::{Identity, Role};
use crate::models::vaccine_batch::BatchId;
use thiserror::Error;

/// Rejection reasons for registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller lacks the privilege the operation requires.
    #[error("caller {caller} is not authorized to {action}")]
    Unauthorized {
        caller: Identity,
        action: &'static str,
    },

    /// An entity with this identity is already registered.
    #[error("entity {0} is already registered")]
    DuplicateEntity(Identity),

    /// No entity is registered under this identity.
    #[error("entity {0} is not registered")]
    UnknownEntity(Identity),

    /// The supplied mode is not one of ISSUER, PROVER or VERIFIER.
    #[error("invalid entity mode {0:?}")]
    InvalidMode(String),

    /// The entity exists but holds the wrong role for this operation.
    #[error("entity {entity} has mode {actual}, expected {expected}")]
    RoleMismatch {
        entity: Identity,
        expected: Role,
        actual: Role,
    },

    /// The signature was not produced by the issuer over the canonical message.
    #[error("signature was not produced by issuer {issuer} over the certified claim")]
    InvalidSignature { issuer: Identity },

    #[error("vaccine batch #{0} does not exist")]
    UnknownBatch(BatchId),

    #[error("vaccine batch #{batch_id} was not manufactured by {prover}")]
    BatchManufacturerMismatch { batch_id: BatchId, prover: Identity },

    #[error("certificate #{0} does not exist")]
    UnknownCertificate(CertificateId),

    #[error("certificate #{0} is already revoked")]
    AlreadyRevoked(CertificateId),

    /// The claim is already on the ledger as this certificate, revoked or not.
    #[error("claim is already recorded as certificate #{0}")]
    DuplicateCertificate(CertificateId),
}

impl RegistryError {
    /// Stable name of the error kind, as surfaced to operators and scripts.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::Unauthorized { .. } => "Unauthorized",
            RegistryError::DuplicateEntity(_) => "DuplicateEntity",
            RegistryError::UnknownEntity(_) => "UnknownEntity",
            RegistryError::InvalidMode(_) => "InvalidMode",
            RegistryError::RoleMismatch { .. } => "RoleMismatch",
            RegistryError::InvalidSignature { .. } => "InvalidSignature",
            RegistryError::UnknownBatch(_) => "UnknownBatch",
            RegistryError::BatchManufacturerMismatch { .. } => "BatchManufacturerMismatch",
            RegistryError::UnknownCertificate(_) => "UnknownCertificate",
            RegistryError::AlreadyRevoked(_) => "AlreadyRevoked",
            RegistryError::DuplicateCertificate(_) => "DuplicateCertificate",
        }
    }
}

/// Failures while decoding identities and signatures from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid identity {input:?}: {reason}")]
    InvalidIdentity { input: String, reason: String },

    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),
}
