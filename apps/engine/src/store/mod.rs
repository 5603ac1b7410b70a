//! Persistent store interface.
//!
//! The store is the single source of truth: no engine component
//! caches learning or session state across operations. Every
//! read-modify-write cycle goes through this trait.

pub mod json;

use std::collections::HashMap;

use async_trait::async_trait;

use srs_core::{DailyCounter, Item, ItemId, LearningState, SessionState, UserId};

use crate::error::StoreError;

pub use json::JsonStore;

/// Abstract CRUD over per-user learning state, session state, daily
/// counters, and the shared item list.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// All learning states for one user, keyed by item.
    async fn learning_states(
        &self,
        user: UserId,
    ) -> Result<HashMap<ItemId, LearningState>, StoreError>;

    /// Learning state for one (user, item), if initialized.
    async fn learning_state(
        &self,
        user: UserId,
        item: ItemId,
    ) -> Result<Option<LearningState>, StoreError>;

    async fn set_learning_state(
        &self,
        user: UserId,
        item: ItemId,
        state: LearningState,
    ) -> Result<(), StoreError>;

    /// Session state for one user; default if never stored.
    async fn session_state(&self, user: UserId) -> Result<SessionState, StoreError>;

    async fn set_session_state(
        &self,
        user: UserId,
        state: SessionState,
    ) -> Result<(), StoreError>;

    /// Daily counter for one user; default if never stored.
    async fn daily_counter(&self, user: UserId) -> Result<DailyCounter, StoreError>;

    async fn set_daily_counter(
        &self,
        user: UserId,
        counter: DailyCounter,
    ) -> Result<(), StoreError>;

    /// All known users, for startup recovery.
    async fn list_users(&self) -> Result<Vec<UserId>, StoreError>;

    async fn list_items(&self) -> Result<Vec<Item>, StoreError>;

    async fn item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    async fn add_item(&self, front: &str, back: &str) -> Result<Item, StoreError>;

    /// Seed a default learning state for (user, item) if absent.
    /// Idempotent; existing state is never overwritten.
    async fn init_item_state(&self, user: UserId, item: ItemId) -> Result<(), StoreError>;
}
