//! Benchmark workload for Stowage.
//!
//! Drives a [`Storage`](stowage_storage::Storage) through the phases of the
//! reference benchmark: entity creation, a storage-free baseline, component
//! addition, mixed checked and unchecked removal, and a view pass that writes
//! one line per entity to an output file.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod components;
pub mod config;
pub mod error;
pub mod report;
pub mod workload;

pub use components::{TestData, V3};
pub use config::DriverConfig;
pub use error::{DriverError, Result};
pub use report::{Phase, Report};
pub use workload::Workload;
