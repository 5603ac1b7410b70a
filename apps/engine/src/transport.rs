//! Notification transport seam.
//!
//! The engine hands a due item's front text to the transport and
//! moves on. Failures are surfaced to the caller and logged; the
//! delivery-queue state is not rolled back (redelivery policy belongs
//! to the transport, not the core).

use std::sync::Arc;

use async_trait::async_trait;

use srs_core::{ItemId, UserId};

use crate::error::{EngineError, TransportError};
use crate::store::ProgressStore;

#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Deliver one due-item notification to the user.
    async fn deliver(&self, user: UserId, front: &str) -> Result<(), TransportError>;
}

/// Look up an item's front text and push it through the transport.
///
/// A missing item is a `NotFound` (the trigger referenced something
/// the store no longer has). Transport failures come back as errors
/// but leave queue state untouched.
pub(crate) async fn deliver_item(
    store: &Arc<dyn ProgressStore>,
    transport: &Arc<dyn NotificationTransport>,
    user: UserId,
    item: ItemId,
) -> Result<(), EngineError> {
    let found = store
        .item(item)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("item {item}")))?;
    transport.deliver(user, &found.front).await?;
    tracing::info!(user = %user, item = %item, "delivered item");
    Ok(())
}

/// Transport that only logs deliveries. Stands in for a real chat
/// transport in the binary and in manual runs.
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn deliver(&self, user: UserId, front: &str) -> Result<(), TransportError> {
        tracing::info!(user = %user, front = %front, "notification delivered");
        Ok(())
    }
}
