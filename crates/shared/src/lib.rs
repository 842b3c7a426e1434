//! Shared types and configuration for the OKR engine.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, EngineConfig, ServerConfig, StorageConfig};
pub use types::{CommentId, GoalId, KeyResultId, StageId, TeamId};
