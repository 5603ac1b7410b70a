//! Review scheduler.
//!
//! Maps each scheduled (user, item) review to exactly one pending
//! timer. Timers are keyed: re-arming a key replaces (aborts) the
//! prior timer, so a re-grade before the old timer fires cannot
//! produce duplicate notifications. Firing re-reads the learning
//! state and drops the trigger silently when it has been superseded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use srs_core::{ItemId, UserId};

use crate::error::Result;
use crate::locks::UserLocks;
use crate::queue::{DeliveryQueue, Offer};
use crate::store::ProgressStore;
use crate::transport::{self, NotificationTransport};

type TimerKey = (UserId, ItemId);

struct TimerSlot {
    seq: u64,
    handle: JoinHandle<()>,
}

/// What startup recovery did for one user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecoverySummary {
    /// Overdue item delivered immediately, if any.
    pub delivered: Option<ItemId>,
    /// Further overdue items force-enqueued behind it.
    pub queued: usize,
    /// Future reviews re-armed as timers.
    pub armed: usize,
}

#[derive(Clone)]
pub struct ReviewScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    store: Arc<dyn ProgressStore>,
    queue: DeliveryQueue,
    transport: Arc<dyn NotificationTransport>,
    locks: UserLocks,
    timers: Mutex<HashMap<TimerKey, TimerSlot>>,
    next_seq: AtomicU64,
}

impl ReviewScheduler {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        queue: DeliveryQueue,
        transport: Arc<dyn NotificationTransport>,
        locks: UserLocks,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                store,
                queue,
                transport,
                locks,
                timers: Mutex::new(HashMap::new()),
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Arm (or replace) the timer for one (user, item) review due at
    /// `due_at` unix seconds. Last write wins.
    pub fn schedule_review(&self, user: UserId, item: ItemId, due_at: i64) {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let delay = Duration::from_secs((due_at - Utc::now().timestamp()).max(0) as u64);

        // Hold the map lock across spawn + insert: a zero-delay timer
        // on another worker thread blocks on this lock for its
        // self-removal, so the slot is always registered before the
        // task can try to remove it.
        let mut timers = self.inner.timers.lock().expect("timer map poisoned");

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.fire(user, item, due_at).await;
            let mut timers = inner.timers.lock().expect("timer map poisoned");
            if let Some(slot) = timers.get(&(user, item)) {
                if slot.seq == seq {
                    timers.remove(&(user, item));
                }
            }
        });

        if let Some(prev) = timers.insert((user, item), TimerSlot { seq, handle }) {
            prev.handle.abort();
        }
        tracing::info!(user = %user, item = %item, due_at, "armed review timer");
    }

    /// Drop the pending timer for (user, item) if one exists.
    pub fn cancel_review(&self, user: UserId, item: ItemId) {
        let mut timers = self.inner.timers.lock().expect("timer map poisoned");
        if let Some(slot) = timers.remove(&(user, item)) {
            slot.handle.abort();
            tracing::info!(user = %user, item = %item, "cancelled review timer");
        }
    }

    /// Number of currently armed timers.
    pub fn pending_count(&self) -> usize {
        self.inner.timers.lock().expect("timer map poisoned").len()
    }

    /// Rebuild one user's schedule from persisted state after a
    /// restart. Session state is force-reset first (a stale in-flight
    /// notification cannot be trusted), then one overdue item is
    /// delivered immediately, the remaining overdue items queue up
    /// behind it, and future reviews are re-armed.
    pub async fn recover_on_startup(&self, user: UserId) -> Result<RecoverySummary> {
        let _guard = self.inner.locks.lock(user).await;

        self.inner.queue.reset(user).await?;

        let states = self.inner.store.learning_states(user).await?;
        let now = Utc::now().timestamp();

        let mut overdue: Vec<(i64, ItemId)> = Vec::new();
        let mut future: Vec<(i64, ItemId)> = Vec::new();
        for (item, state) in &states {
            if state.next_due_at == 0 {
                continue;
            }
            if state.next_due_at <= now {
                overdue.push((state.next_due_at, *item));
            } else {
                future.push((state.next_due_at, *item));
            }
        }
        overdue.sort();
        future.sort();

        let mut summary = RecoverySummary::default();

        let mut overdue = overdue.into_iter();
        if let Some((_, first)) = overdue.next() {
            // Queue was just reset, so this is always DeliverNow.
            if self.inner.queue.offer(user, first).await? == Offer::DeliverNow {
                if let Err(e) =
                    transport::deliver_item(&self.inner.store, &self.inner.transport, user, first)
                        .await
                {
                    tracing::warn!(user = %user, item = %first, error = %e, "overdue delivery failed");
                }
            }
            summary.delivered = Some(first);
        }
        for (_, item) in overdue {
            self.inner.queue.force_enqueue(user, item).await?;
            summary.queued += 1;
        }

        for (due_at, item) in future {
            self.schedule_review(user, item, due_at);
            summary.armed += 1;
        }

        tracing::info!(
            user = %user,
            delivered = ?summary.delivered,
            queued = summary.queued,
            armed = summary.armed,
            "recovered schedule from store"
        );
        Ok(summary)
    }

    /// Startup recovery across every user the store knows.
    pub async fn recover_all(&self) -> Result<usize> {
        let users = self.inner.store.list_users().await?;
        let count = users.len();
        for user in users {
            self.recover_on_startup(user).await?;
        }
        tracing::info!(users = count, "startup recovery complete");
        Ok(count)
    }

    /// Abort every pending timer.
    pub fn shutdown(&self) {
        let mut timers = self.inner.timers.lock().expect("timer map poisoned");
        for (_, slot) in timers.drain() {
            slot.handle.abort();
        }
    }
}

impl SchedulerInner {
    /// Timer callback. Re-validates against the store before doing
    /// anything: a trigger whose backing state is gone or whose due
    /// timestamp no longer matches was superseded by newer grading
    /// and is a no-op.
    async fn fire(&self, user: UserId, item: ItemId, armed_for: i64) {
        let _guard = self.locks.lock(user).await;

        let state = match self.store.learning_state(user, item).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                tracing::debug!(user = %user, item = %item, "trigger fired for missing state, dropping");
                return;
            }
            Err(e) => {
                tracing::error!(user = %user, item = %item, error = %e, "trigger fired but store read failed");
                return;
            }
        };

        if state.next_due_at != armed_for {
            tracing::debug!(user = %user, item = %item, "trigger superseded, dropping");
            return;
        }

        match self.queue.offer(user, item).await {
            Ok(Offer::DeliverNow) => {
                if let Err(e) =
                    transport::deliver_item(&self.store, &self.transport, user, item).await
                {
                    tracing::warn!(user = %user, item = %item, error = %e, "due delivery failed");
                }
            }
            Ok(Offer::Queued) => {}
            Err(e) => {
                tracing::error!(user = %user, item = %item, error = %e, "offer failed on trigger");
            }
        }
    }
}
