//! Per-user critical sections.
//!
//! Timer callbacks and user-initiated actions both mutate the same
//! user's session, counter, and learning state. Everything that
//! read-modify-writes a user's documents takes that user's lock
//! first; operations on different users run in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use srs_core::UserId;

#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one user, creating it on first use.
    pub async fn lock(&self, user: UserId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().expect("user lock map poisoned");
            Arc::clone(map.entry(user).or_default())
        };
        slot.lock_owned().await
    }
}
