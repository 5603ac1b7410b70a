//! JSON document store.
//!
//! Two whole-document files under a data directory: `items.json`
//! (shared item list) and `progress.json` (per-user learning state,
//! session state, daily counter). Writes are atomic replace-on-write
//! through a temp file in the same directory, so a crash mid-write
//! never corrupts the previous document.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::Mutex;

use srs_core::{DailyCounter, Item, ItemId, LearningState, SessionState, UserId};

use super::ProgressStore;
use crate::error::StoreError;

/// Everything stored for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserRecord {
    #[serde(default)]
    items: HashMap<ItemId, LearningState>,
    #[serde(default)]
    session: SessionState,
    #[serde(default)]
    daily: DailyCounter,
}

type ProgressDoc = HashMap<UserId, UserRecord>;

pub struct JsonStore {
    items_path: PathBuf,
    progress_path: PathBuf,
    // Serializes read-modify-write cycles on each document so two
    // concurrent mutations cannot lose each other's update.
    items_guard: Mutex<()>,
    progress_guard: Mutex<()>,
}

impl JsonStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            items_path: data_dir.join("items.json"),
            progress_path: data_dir.join("progress.json"),
            items_guard: Mutex::new(()),
            progress_guard: Mutex::new(()),
        })
    }

    fn read_doc<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
        if !path.exists() {
            return Ok(T::default());
        }
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_doc<T: Serialize>(path: &Path, doc: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn load_progress(&self) -> Result<ProgressDoc, StoreError> {
        Self::read_doc(&self.progress_path)
    }

    fn save_progress(&self, doc: &ProgressDoc) -> Result<(), StoreError> {
        Self::write_doc(&self.progress_path, doc)
    }

    fn load_items(&self) -> Result<Vec<Item>, StoreError> {
        Self::read_doc(&self.items_path)
    }
}

#[async_trait]
impl ProgressStore for JsonStore {
    async fn learning_states(
        &self,
        user: UserId,
    ) -> Result<HashMap<ItemId, LearningState>, StoreError> {
        let doc = self.load_progress()?;
        Ok(doc.get(&user).map(|r| r.items.clone()).unwrap_or_default())
    }

    async fn learning_state(
        &self,
        user: UserId,
        item: ItemId,
    ) -> Result<Option<LearningState>, StoreError> {
        let doc = self.load_progress()?;
        Ok(doc.get(&user).and_then(|r| r.items.get(&item).cloned()))
    }

    async fn set_learning_state(
        &self,
        user: UserId,
        item: ItemId,
        state: LearningState,
    ) -> Result<(), StoreError> {
        let _guard = self.progress_guard.lock().await;
        let mut doc = self.load_progress()?;
        doc.entry(user).or_default().items.insert(item, state);
        self.save_progress(&doc)
    }

    async fn session_state(&self, user: UserId) -> Result<SessionState, StoreError> {
        let doc = self.load_progress()?;
        Ok(doc.get(&user).map(|r| r.session.clone()).unwrap_or_default())
    }

    async fn set_session_state(
        &self,
        user: UserId,
        state: SessionState,
    ) -> Result<(), StoreError> {
        let _guard = self.progress_guard.lock().await;
        let mut doc = self.load_progress()?;
        doc.entry(user).or_default().session = state;
        self.save_progress(&doc)
    }

    async fn daily_counter(&self, user: UserId) -> Result<DailyCounter, StoreError> {
        let doc = self.load_progress()?;
        Ok(doc.get(&user).map(|r| r.daily.clone()).unwrap_or_default())
    }

    async fn set_daily_counter(
        &self,
        user: UserId,
        counter: DailyCounter,
    ) -> Result<(), StoreError> {
        let _guard = self.progress_guard.lock().await;
        let mut doc = self.load_progress()?;
        doc.entry(user).or_default().daily = counter;
        self.save_progress(&doc)
    }

    async fn list_users(&self) -> Result<Vec<UserId>, StoreError> {
        let doc = self.load_progress()?;
        let mut users: Vec<UserId> = doc.keys().copied().collect();
        users.sort();
        Ok(users)
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        self.load_items()
    }

    async fn item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let items = self.load_items()?;
        Ok(items.into_iter().find(|i| i.id == id))
    }

    async fn add_item(&self, front: &str, back: &str) -> Result<Item, StoreError> {
        let _guard = self.items_guard.lock().await;
        let mut items = self.load_items()?;
        let item = Item {
            id: ItemId::new(),
            front: front.to_string(),
            back: back.to_string(),
        };
        items.push(item.clone());
        Self::write_doc(&self.items_path, &items)?;
        tracing::info!(item = %item.id, front = %item.front, "added item");
        Ok(item)
    }

    async fn init_item_state(&self, user: UserId, item: ItemId) -> Result<(), StoreError> {
        let _guard = self.progress_guard.lock().await;
        let mut doc = self.load_progress()?;
        let record = doc.entry(user).or_default();
        if record.items.contains_key(&item) {
            return Ok(());
        }
        record.items.insert(item, LearningState::default());
        self.save_progress(&doc)
    }
}
