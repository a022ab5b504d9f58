//! Per-campaign write serialization.
//!
//! Stores hold no in-memory campaign state; the filesystem is the only shared
//! resource. Two concurrent updates of the same campaign could still read the
//! same pre-update file and overwrite each other. `CampaignLocks` hands out
//! one async mutex per campaign id so update handlers for one campaign run one
//! at a time, while different campaigns proceed in parallel.
//!
//! An entry lives only while some request holds or waits for it. This only
//! covers writers inside this process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Which artifact a lock guards. Config and template writes for the same
/// campaign do not conflict with each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Artifact {
    Config,
    Template,
}

type LockKey = (Artifact, String);
type Registry = HashMap<LockKey, Arc<AsyncMutex<()>>>;

/// Clonable registry of write locks, shared as actix `web::Data`.
#[derive(Clone, Default)]
pub struct CampaignLocks {
    locks: Arc<Mutex<Registry>>,
}

/// Exclusive write access to one campaign artifact.
///
/// Dropping it releases the lock and removes the registry entry once nobody
/// else holds or waits for it.
pub struct CampaignGuard {
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<Mutex<Registry>>,
}

fn registry(locks: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // The map stays consistent even if a holder panicked.
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CampaignLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive write access to `artifact` of `campaign_id`.
    ///
    /// Callers validate `campaign_id` first.
    pub async fn acquire(&self, artifact: Artifact, campaign_id: &str) -> CampaignGuard {
        let key = (artifact, campaign_id.to_string());
        let lock = registry(&self.locks)
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();

        CampaignGuard {
            key,
            guard: Some(lock.lock_owned().await),
            locks: self.locks.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn registered(&self) -> usize {
        registry(&self.locks).len()
    }
}

impl Drop for CampaignGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = registry(&self.locks);
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}
