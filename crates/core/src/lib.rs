//! Core business logic for the OKR engine.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Progress is derived bottom-up (key result → goal → team-quarter) on every
//! read; mutations go through [`service::OkrService`].
//!
//! # Modules
//!
//! - `measure` - Measure kinds and per-key-result progress
//! - `key_result` - Key result updates and comments
//! - `goal` - Goal edits, key result ordering and goal progress
//! - `quarter` - Team-quarter rollup, status lifecycle and lock policy
//! - `sharing` - Weighted goal links across teams
//! - `hierarchy` - Team tree walks and dashboard rows
//! - `locks` - Per team-quarter write locks
//! - `repository` - Persistence boundary
//! - `service` - Orchestration of queries and mutations

pub mod comment;
pub mod error;
pub mod goal;
pub mod hierarchy;
pub mod key_result;
pub mod locks;
pub mod measure;
pub mod ordering;
pub mod quarter;
pub mod repository;
pub mod service;
pub mod sharing;
pub mod validation;
pub mod weight;

pub use error::{Entity, OkrError, OkrResult};
pub use repository::{ChangeSet, OkrRepository};
pub use service::OkrService;
