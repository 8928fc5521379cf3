use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use loanline_core::domain::session::SessionId;

/// Per-session mutual exclusion. Holding the guard serializes every read-modify-write of one
/// session while leaving other sessions free to proceed.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    pub async fn acquire(&self, id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = match self.locks.lock() {
                Ok(locks) => locks,
                Err(poisoned) => poisoned.into_inner(),
            };
            locks.entry(id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drops the lock entry of a deleted session. Takes the held guard so the entry can only be
    /// removed by its owner; an entry other tasks still wait on is kept and keeps serializing them.
    pub fn forget(&self, id: &SessionId, guard: OwnedMutexGuard<()>) {
        let mut locks = match self.locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        let held = OwnedMutexGuard::mutex(&guard);
        // One reference lives in the map, one in the guard. Any more belong to waiters.
        let uncontended = locks
            .get(id)
            .is_some_and(|entry| Arc::ptr_eq(entry, held) && Arc::strong_count(entry) == 2);
        if uncontended {
            locks.remove(id);
        }
        drop(guard);
    }

    pub fn len(&self) -> usize {
        match self.locks.lock() {
            Ok(locks) => locks.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
