//! Packed component storage for Stowage.
//!
//! This crate provides:
//! - [`PackedPool`] - Dense per-type component pool with sparse indirection
//! - [`Handle`] - Generation-checked, reference-counted component reference
//! - [`Storage`] - Entity allocation and one pool per component type
//! - [`View`] / [`ViewMut`] - Iteration over the intersection of several pools
//!
//! Everything here is single-threaded: pools, handles, and views are
//! neither `Send` nor `Sync`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod config;
pub mod entity;
pub mod handle;
pub mod pool;
pub mod reference;
pub mod set;
pub mod storage;
pub mod view;

pub use component::Component;
pub use config::StorageConfig;
pub use entity::EntitySet;
pub use handle::Handle;
pub use pool::PackedPool;
pub use reference::{Raw, ReferenceStyle, Stable};
pub use set::{ComponentSet, Query};
pub use storage::Storage;
pub use view::{View, ViewCursor, ViewIter, ViewMut};

pub use stowage_foundation::{Entity, Error, ErrorKind, RemovePolicy, Result, Safety};
