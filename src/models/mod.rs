// src/models/mod.rs
pub mod certificate;
pub mod entity;
pub mod vaccine_batch;
