//! Storage layer for the OKR engine.
//!
//! This crate provides:
//! - `MemoryStore`, an [`okrs_core::OkrRepository`] applying change sets atomically
//! - JSON snapshots for persisting a store between runs
//! - Demo data used by the seeder and tests

pub mod error;
pub mod seed;
pub mod snapshot;
pub mod store;

pub use error::StoreError;
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, StatusRecord};
pub use store::MemoryStore;
