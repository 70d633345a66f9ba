// src/services/operations.rs
//! Operation scripts.
//!
//! Administrative tooling describes registry calls as JSON and replays them
//! in order against a [`ColdChain`]. Each operation names an optional
//! `caller`; when absent the script runs it as the registry owner.
//!
//! ```json
//! { "operations": [
//!     { "op": "addEntity", "id": "0x…", "mode": "PROVER" },
//!     { "op": "addVaccineBatch", "brand": "Moderna", "manufacturer": "0x…" },
//!     { "op": "issueCertificate", "issuer": "0x…", "prover": "0x…", "signature": "0x…" },
//!     { "op": "revokeCertificate", "certificateId": 0 }
//! ] }
//! ```
//!
//! Roles arrive as strings and are parsed here, so an unknown mode is
//! reported as an `InvalidMode` rejection of that operation.

use crate::contracts::cold_chain::ColdChain;
use crate::contracts::event_log::RecordedEvent;
use crate::error::RegistryError;
use crate::models::certificate::{Certificate, CertificateId, CertificateSignature};
use crate::models::entity::{Entity, Identity, Role};
use crate::models::vaccine_batch::BatchId;
use crate::services::verifier::IdentityVerifier;
use crate::utils::serialization::deserialize;
use serde::{Deserialize, Serialize};

/// A single registry call.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    AddEntity {
        caller: Option<Identity>,
        id: Identity,
        mode: String,
    },
    AddVaccineBatch {
        caller: Option<Identity>,
        brand: String,
        manufacturer: Identity,
    },
    /// Plain certificate, or batch-scoped when `batch` is present
    IssueCertificate {
        caller: Option<Identity>,
        issuer: Identity,
        prover: Identity,
        batch: Option<BatchId>,
        signature: CertificateSignature,
    },
    #[serde(rename_all = "camelCase")]
    RevokeCertificate {
        caller: Option<Identity>,
        certificate_id: CertificateId,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddEntity { .. } => "addEntity",
            Operation::AddVaccineBatch { .. } => "addVaccineBatch",
            Operation::IssueCertificate { .. } => "issueCertificate",
            Operation::RevokeCertificate { .. } => "revokeCertificate",
        }
    }

    fn caller(&self) -> Option<Identity> {
        match self {
            Operation::AddEntity { caller, .. }
            | Operation::AddVaccineBatch { caller, .. }
            | Operation::IssueCertificate { caller, .. }
            | Operation::RevokeCertificate { caller, .. } => *caller,
        }
    }
}

/// What a successful operation produced.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Applied {
    Entity(Entity),
    Id(u64),
    Certificate(Certificate),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: &'static str,
    pub message: String,
}

impl From<RegistryError> for Rejection {
    fn from(err: RegistryError) -> Self {
        Rejection {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of one script step.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub index: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<Applied>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Rejection>,
}

/// A list of operations applied in order.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OperationScript {
    pub operations: Vec<Operation>,
}

/// Outcomes of a script run followed by the resulting event log.
#[derive(Serialize, Debug, Clone)]
pub struct ScriptReport {
    pub owner: Identity,
    pub outcomes: Vec<OperationOutcome>,
    pub events: Vec<RecordedEvent>,
}

impl OperationScript {
    /// Parses a script from JSON.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        deserialize(json)
    }

    /// Applies every operation in order. A rejected operation does not stop
    /// the run; its error is recorded in the outcome.
    pub async fn run<V: IdentityVerifier>(&self, registry: &ColdChain<V>) -> ScriptReport {
        let mut outcomes = Vec::with_capacity(self.operations.len());
        for (index, operation) in self.operations.iter().enumerate() {
            let (ok, error) = match apply(registry, operation).await {
                Ok(applied) => (Some(applied), None),
                Err(e) => (None, Some(Rejection::from(e))),
            };
            outcomes.push(OperationOutcome {
                index,
                op: operation.name(),
                ok,
                error,
            });
        }
        ScriptReport {
            owner: registry.owner(),
            outcomes,
            events: registry.events().await,
        }
    }
}

/// Executes one operation against the registry.
pub async fn apply<V: IdentityVerifier>(
    registry: &ColdChain<V>,
    operation: &Operation,
) -> Result<Applied, RegistryError> {
    let caller = operation.caller().unwrap_or_else(|| registry.owner());
    match operation {
        Operation::AddEntity { id, mode, .. } => {
            let mode: Role = mode.parse()?;
            registry
                .add_entity(&caller, *id, mode)
                .await
                .map(Applied::Entity)
        }
        Operation::AddVaccineBatch {
            brand,
            manufacturer,
            ..
        } => registry
            .add_vaccine_batch(&caller, brand.clone(), *manufacturer)
            .await
            .map(Applied::Id),
        Operation::IssueCertificate {
            issuer,
            prover,
            batch,
            signature,
            ..
        } => {
            let issued = match batch {
                Some(batch) => {
                    registry
                        .issue_batch_certificate(&caller, *issuer, *prover, *batch, signature.clone())
                        .await
                }
                None => {
                    registry
                        .issue_certificate(&caller, *issuer, *prover, signature.clone())
                        .await
                }
            };
            issued.map(Applied::Id)
        }
        Operation::RevokeCertificate { certificate_id, .. } => registry
            .revoke_certificate(&caller, *certificate_id)
            .await
            .map(Applied::Certificate),
    }
}
