// src/lib.rs

//! # Cold-Chain Certification Registry
//!
//! Role-gated registry for a vaccine cold-chain: participants, the vaccine
//! batches they produce, and signed inspection certificates that any third
//! party can re-verify without trusting the issuer.
//!
//! ## Architecture Overview
//! 1. **Models**: entities, vaccine batches, certificates and their canonical claims
//! 2. **Contracts**: the registry tables, the event log and [`ColdChain`] which
//!    serializes all mutations behind one writer lock
//! 3. **Services**: signature verification and operation scripts
//! 4. **Wallet**: issuer-side signing compatible with `eth_sign`

pub mod contracts; // Registry state and events
pub mod error;
pub mod models; // Data structures
pub mod services; // Verification and scripting
pub mod settings;
pub mod utils; // Hashing and serialization helpers
pub mod wallet; // Issuer key management

pub use contracts::cold_chain::ColdChain;
pub use contracts::event_log::{Event, RecordedEvent};
pub use error::RegistryError;
pub use models::certificate::{Certificate, CertificateClaim, CertificateSignature};
pub use models::entity::{Entity, Identity, Role};
pub use models::vaccine_batch::VaccineBatch;
pub use services::verifier::{EcdsaVerifier, IdentityVerifier};
