//! Goal sharing: one weighted link per team a goal appears in.

pub mod resolver;
pub mod types;

pub use resolver::{SharePlan, SharingResolver};
pub use types::{ShareLink, ShareTarget};
