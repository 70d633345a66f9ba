// src/contracts/mod.rs
//! Registry state: entity, batch and certificate tables plus the event log.

pub mod batch_registry;
pub mod certificate_ledger;
pub mod cold_chain;
pub mod entity_registry;
pub mod event_log;
