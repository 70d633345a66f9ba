// src/models/vaccine_batch.rs
//! Vaccine batch records.

use crate::models::entity::Identity;
use serde::{Deserialize, Serialize};

/// Sequential batch identifier, assigned by the registry starting at 0.
pub type BatchId = u64;

/// A batch of vaccine doses produced by a registered manufacturer.
///
/// Batches are immutable once recorded. The manufacturer held the PROVER
/// role at the time the batch was added.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VaccineBatch {
    pub id: BatchId,

    /// Product name, e.g. "Pfizer-BioNTech"
    pub brand: String,

    pub manufacturer: Identity,
}
