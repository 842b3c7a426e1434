//! Demo data seeder for OKR development and testing.
//!
//! Builds the demo hierarchy, fills the current quarter with sample goals
//! and writes the result as a JSON snapshot the server can load through
//! `OKRS__STORAGE__SNAPSHOT_PATH`.
//!
//! Usage: cargo run --bin seeder -- [snapshot-path]

use std::sync::Arc;

use chrono::Utc;
use okrs_core::OkrService;
use okrs_core::quarter::Quarter;
use okrs_db::MemoryStore;
use okrs_db::seed::{demo_teams, seed_demo};
use okrs_shared::AppConfig;

const DEFAULT_SNAPSHOT_PATH: &str = "okrs-snapshot.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let path = std::env::args()
        .nth(1)
        .or(config.storage.snapshot_path)
        .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string());

    let store = Arc::new(MemoryStore::with_teams(demo_teams()));
    let service = OkrService::new(store.clone(), &config.engine);
    let quarter = Quarter::containing(Utc::now().date_naive());

    println!("Seeding demo goals for {quarter}...");
    seed_demo(&service, quarter).await?;

    println!("Writing snapshot to {path}...");
    store.snapshot().await.save(&path).await?;

    println!("Seeding complete!");
    Ok(())
}
