//! Shared test harness: a temp-dir JSON store, a recording mock
//! transport, and an engine with pacing disabled.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use srs_core::{DailyCounter, Item, ItemId, LearningState, SessionState, UserId};
use vocabot_engine::{
    Engine, EngineConfig, JsonStore, NotificationTransport, ProgressStore, StoreError,
    TransportError,
};

/// Transport that records every delivery and can be told to fail.
#[derive(Default)]
pub struct MockTransport {
    deliveries: Mutex<Vec<(UserId, String)>>,
    fail: AtomicBool,
}

impl MockTransport {
    pub fn deliveries(&self) -> Vec<(UserId, String)> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationTransport for MockTransport {
    async fn deliver(&self, user: UserId, front: &str) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::DeliveryFailed {
                user: user.0,
                reason: "mock transport failure".into(),
            });
        }
        self.deliveries
            .lock()
            .unwrap()
            .push((user, front.to_string()));
        Ok(())
    }
}

/// Store wrapper whose writes can be toggled to fail, for asserting
/// that operations hitting a store error are not applied.
pub struct FailingStore {
    inner: JsonStore,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new(inner: JsonStore) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other(
                "injected store failure",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for FailingStore {
    async fn learning_states(
        &self,
        user: UserId,
    ) -> Result<HashMap<ItemId, LearningState>, StoreError> {
        self.inner.learning_states(user).await
    }

    async fn learning_state(
        &self,
        user: UserId,
        item: ItemId,
    ) -> Result<Option<LearningState>, StoreError> {
        self.inner.learning_state(user, item).await
    }

    async fn set_learning_state(
        &self,
        user: UserId,
        item: ItemId,
        state: LearningState,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.set_learning_state(user, item, state).await
    }

    async fn session_state(&self, user: UserId) -> Result<SessionState, StoreError> {
        self.inner.session_state(user).await
    }

    async fn set_session_state(
        &self,
        user: UserId,
        state: SessionState,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.set_session_state(user, state).await
    }

    async fn daily_counter(&self, user: UserId) -> Result<DailyCounter, StoreError> {
        self.inner.daily_counter(user).await
    }

    async fn set_daily_counter(
        &self,
        user: UserId,
        counter: DailyCounter,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.set_daily_counter(user, counter).await
    }

    async fn list_users(&self) -> Result<Vec<UserId>, StoreError> {
        self.inner.list_users().await
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        self.inner.list_items().await
    }

    async fn item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        self.inner.item(id).await
    }

    async fn add_item(&self, front: &str, back: &str) -> Result<Item, StoreError> {
        self.check_write()?;
        self.inner.add_item(front, back).await
    }

    async fn init_item_state(&self, user: UserId, item: ItemId) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.init_item_state(user, item).await
    }
}

pub struct TestContext {
    _dir: tempfile::TempDir,
    pub store: Arc<JsonStore>,
    pub transport: Arc<MockTransport>,
    pub engine: Engine,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Arc::new(JsonStore::new(dir.path()).expect("json store"));
        let transport = Arc::new(MockTransport::default());
        let config = EngineConfig {
            data_dir: dir.path().to_path_buf(),
            tz_offset_hours: 0,
            default_daily_goal: 5,
            pacing_delay: Duration::ZERO,
        };
        let engine = Engine::new(store.clone(), transport.clone(), &config);
        Self {
            _dir: dir,
            store,
            transport,
            engine,
        }
    }

    /// Add `count` items and seed learning state for `user`.
    pub async fn seed(&self, user: UserId, count: usize) -> Vec<Item> {
        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            let item = self
                .engine
                .add_item(&format!("front-{i}"), &format!("back-{i}"))
                .await
                .expect("add item");
            items.push(item);
        }
        self.engine.onboard_user(user).await.expect("onboard");
        items
    }
}

/// Like [`TestContext`], but over a [`FailingStore`] so tests can
/// inject persistence failures.
pub struct FailingContext {
    _dir: tempfile::TempDir,
    pub store: Arc<FailingStore>,
    pub transport: Arc<MockTransport>,
    pub engine: Engine,
}

impl FailingContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Arc::new(FailingStore::new(
            JsonStore::new(dir.path()).expect("json store"),
        ));
        let transport = Arc::new(MockTransport::default());
        let config = EngineConfig {
            data_dir: dir.path().to_path_buf(),
            tz_offset_hours: 0,
            default_daily_goal: 5,
            pacing_delay: Duration::ZERO,
        };
        let engine = Engine::new(store.clone(), transport.clone(), &config);
        Self {
            _dir: dir,
            store,
            transport,
            engine,
        }
    }

    pub async fn seed(&self, user: UserId, count: usize) -> Vec<Item> {
        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            let item = self
                .engine
                .add_item(&format!("front-{i}"), &format!("back-{i}"))
                .await
                .expect("add item");
            items.push(item);
        }
        self.engine.onboard_user(user).await.expect("onboard");
        items
    }
}
