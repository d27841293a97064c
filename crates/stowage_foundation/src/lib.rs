//! Core types for Stowage.
//!
//! This crate provides:
//! - [`Entity`] - Monotonic, never-recycled entity identifiers
//! - [`Safety`], [`RemovePolicy`] - Per-call storage policies
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod policy;

pub use entity::Entity;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use policy::{RemovePolicy, Safety};
