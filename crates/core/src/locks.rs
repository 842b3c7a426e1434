//! Per team-quarter write locks.

use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::{Instant, timeout_at};
use tracing::warn;

use crate::error::{OkrError, OkrResult};
use crate::quarter::TeamQuarter;

/// Registry of exclusive locks keyed by team-quarter.
///
/// Multi-key acquisition always proceeds in ascending key order, so two
/// mutations never wait on each other crosswise.
/// Entries exist only while some request holds or awaits them.
#[derive(Debug)]
pub struct QuarterLocks {
    locks: Arc<Registry>,
    timeout: Duration,
}

type Registry = DashMap<TeamQuarter, Arc<Mutex<()>>>;

/// Held locks; released on drop.
#[derive(Debug)]
pub struct QuarterGuard {
    keys: BTreeSet<TeamQuarter>,
    guards: Vec<OwnedMutexGuard<()>>,
    registry: Arc<Registry>,
}

impl Drop for QuarterGuard {
    fn drop(&mut self) {
        self.guards.clear();
        prune(&self.registry, &self.keys);
    }
}

/// Removes entries nobody else holds or waits on.
fn prune<'a>(registry: &Registry, keys: impl IntoIterator<Item = &'a TeamQuarter>) {
    for key in keys {
        registry.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl QuarterGuard {
    /// Whether `key` is held by this guard.
    #[must_use]
    pub fn covers(&self, key: &TeamQuarter) -> bool {
        self.keys.contains(key)
    }
}

impl QuarterLocks {
    /// Creates a registry whose acquisitions give up after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
            timeout,
        }
    }

    /// Number of team-quarters currently held or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// True when no lock is held or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Acquires every key, in ascending order, within one deadline.
    ///
    /// # Errors
    /// `Busy` naming the first key that could not be taken in time. Locks
    /// taken so far are released.
    pub async fn acquire(
        &self,
        keys: impl IntoIterator<Item = TeamQuarter>,
    ) -> OkrResult<QuarterGuard> {
        let keys: BTreeSet<TeamQuarter> = keys.into_iter().collect();
        let deadline = Instant::now() + self.timeout;
        let mut held = QuarterGuard {
            keys: BTreeSet::new(),
            guards: Vec::with_capacity(keys.len()),
            registry: Arc::clone(&self.locks),
        };
        for key in keys {
            let lock = self.locks.entry(key).or_default().value().clone();
            match timeout_at(deadline, lock.lock_owned()).await {
                Ok(guard) => {
                    held.guards.push(guard);
                    held.keys.insert(key);
                }
                Err(_) => {
                    warn!(team_id = %key.team_id, quarter = %key.quarter, "Quarter lock timed out");
                    prune(&self.locks, [&key]);
                    return Err(OkrError::Busy {
                        team_id: key.team_id,
                        quarter: key.quarter,
                    });
                }
            }
        }
        Ok(held)
    }
}
