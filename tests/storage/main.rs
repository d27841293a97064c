//! Integration tests for Layer 1: Storage
//!
//! Tests for packed pools, handles, the storage container, and views.

mod handles;
mod storage;
mod views;
