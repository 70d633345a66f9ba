// src/services/mod.rs
pub mod operations;
pub mod verifier;
