// src/contracts/event_log.rs
//! Append-only audit events.
//!
//! Field names follow the registry's published event ABI (`entityId`,
//! `entityMode`, `vaccineBatchId`, ...) so that external auditing tools can
//! consume the JSON form directly.

use crate::models::certificate::CertificateId;
use crate::models::entity::{Identity, Role};
use crate::models::vaccine_batch::BatchId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A state change committed by the registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    AddEntity { entity_id: Identity, entity_mode: Role },

    #[serde(rename_all = "camelCase")]
    AddVaccineBatch {
        vaccine_batch_id: BatchId,
        manufacturer: Identity,
    },

    IssueCertificate { issuer: Identity, prover: Identity },

    #[serde(rename_all = "camelCase")]
    RevokeCertificate {
        certificate_id: CertificateId,
        revoked_by: Identity,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::AddEntity { .. } => "AddEntity",
            Event::AddVaccineBatch { .. } => "AddVaccineBatch",
            Event::IssueCertificate { .. } => "IssueCertificate",
            Event::RevokeCertificate { .. } => "RevokeCertificate",
        }
    }
}

/// An event together with its position in the log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordedEvent {
    /// Zero-based, gap-free position in the log
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

/// The registry's event log plus a live feed for subscribers.
#[derive(Debug)]
pub struct EventLog {
    events: Vec<RecordedEvent>,
    sender: broadcast::Sender<RecordedEvent>,
}

impl EventLog {
    /// Creates an empty log whose live feed buffers up to `capacity` events
    /// per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        EventLog {
            events: Vec::new(),
            sender,
        }
    }

    /// Appends an event and forwards it to live subscribers.
    pub fn append(&mut self, event: Event) -> &RecordedEvent {
        let recorded = RecordedEvent {
            sequence: self.events.len() as u64,
            recorded_at: Utc::now(),
            event,
        };
        // No subscribers is not an error; the log itself is authoritative.
        let _ = self.sender.send(recorded.clone());
        self.events.push(recorded);
        &self.events[self.events.len() - 1]
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordedEvent> {
        self.sender.subscribe()
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
