//! Per-user delivery queue.
//!
//! A user is either free (no outstanding notification) or busy
//! (exactly one delivered notification awaiting an answer). Items
//! that come due while busy queue up FIFO and are drained one at a
//! time as answers arrive. State lives entirely in the store; every
//! operation is a fresh read-modify-write so the machine survives
//! restarts.

use std::sync::Arc;

use srs_core::{ItemId, SessionState, UserId};

use crate::error::Result;
use crate::store::ProgressStore;

/// Outcome of offering an item for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// User was free: deliver immediately. The user is now busy with
    /// this item.
    DeliverNow,
    /// User was busy: the item was queued (or already queued) and
    /// must not be delivered yet.
    Queued,
}

#[derive(Clone)]
pub struct DeliveryQueue {
    store: Arc<dyn ProgressStore>,
}

impl DeliveryQueue {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Offer an item for delivery. Free user: marks busy, sets the
    /// current item, returns [`Offer::DeliverNow`]. Busy user:
    /// appends to the pending queue unless already present.
    pub async fn offer(&self, user: UserId, item: ItemId) -> Result<Offer> {
        let mut session = self.store.session_state(user).await?;

        if session.busy {
            if !session.pending_queue.contains(&item) {
                session.pending_queue.push(item);
                self.store.set_session_state(user, session.clone()).await?;
                tracing::info!(
                    user = %user,
                    item = %item,
                    queue_len = session.pending_queue.len(),
                    "user busy, item queued"
                );
            }
            Ok(Offer::Queued)
        } else {
            session.busy = true;
            session.current_item = Some(item);
            self.store.set_session_state(user, session).await?;
            tracing::info!(user = %user, item = %item, "user free, delivering now");
            Ok(Offer::DeliverNow)
        }
    }

    /// Unconditionally queue an item regardless of busy state (bulk
    /// catch-up at restart). Never flips the busy flag.
    pub async fn force_enqueue(&self, user: UserId, item: ItemId) -> Result<()> {
        let mut session = self.store.session_state(user).await?;
        if !session.pending_queue.contains(&item) {
            session.pending_queue.push(item);
            self.store.set_session_state(user, session.clone()).await?;
            tracing::info!(
                user = %user,
                item = %item,
                queue_len = session.pending_queue.len(),
                "force-enqueued item"
            );
        }
        Ok(())
    }

    /// The outstanding notification was answered. Pops the queue
    /// head: `Some` means the user stays busy and the returned item
    /// should be delivered next; `None` means the user is free again.
    pub async fn answered(&self, user: UserId) -> Result<Option<ItemId>> {
        let mut session = self.store.session_state(user).await?;

        if session.pending_queue.is_empty() {
            session.busy = false;
            session.current_item = None;
            self.store.set_session_state(user, session).await?;
            tracing::info!(user = %user, "queue empty, user is now free");
            Ok(None)
        } else {
            let next = session.pending_queue.remove(0);
            session.busy = true;
            session.current_item = Some(next);
            self.store.set_session_state(user, session.clone()).await?;
            tracing::info!(
                user = %user,
                item = %next,
                remaining = session.pending_queue.len(),
                "popped next item from queue"
            );
            Ok(Some(next))
        }
    }

    /// Force the user free and drop all queued items (session
    /// start/stop, process restart). Clears mode and current item:
    /// stale in-flight state cannot be trusted.
    pub async fn reset(&self, user: UserId) -> Result<()> {
        let session = self.store.session_state(user).await?;
        let dropped = session.pending_queue.len();
        self.store
            .set_session_state(user, SessionState::default())
            .await?;
        if dropped > 0 || session.busy {
            tracing::info!(user = %user, dropped, "reset delivery queue");
        }
        Ok(())
    }

    pub async fn queue_len(&self, user: UserId) -> Result<usize> {
        Ok(self.store.session_state(user).await?.pending_queue.len())
    }

    pub async fn is_busy(&self, user: UserId) -> Result<bool> {
        Ok(self.store.session_state(user).await?.busy)
    }
}
