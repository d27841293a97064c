//! Stowage - Packed entity/component storage
//!
//! This crate re-exports all layers of the Stowage system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: stowage_driver      — Benchmark workload and CLI
//! Layer 1: stowage_storage     — Packed pools, handles, storage, views
//! Layer 0: stowage_foundation  — Core types (Entity, policies, Error)
//! ```

pub use stowage_driver as driver;
pub use stowage_foundation as foundation;
pub use stowage_storage as storage;
