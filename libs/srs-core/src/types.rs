//! Core types for the spaced-repetition engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// User identifier (chat-id style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A learnable item: front side shown first, back side is the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub front: String,
    pub back: String,
}

/// Review grade on the 0-5 SM-2 scale.
///
/// 0-2 are failing grades (lapse), 3-5 are passing. Only
/// constructible through validation, so a held `Grade` is always in
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade(u8);

impl Grade {
    pub const PASS_THRESHOLD: u8 = 3;

    /// Validate a raw grade. Values outside 0-5 are rejected.
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if value > 5 {
            return Err(CoreError::InvalidGrade { value });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// A passing grade keeps the repetition streak going.
    pub fn is_pass(self) -> bool {
        self.0 >= Self::PASS_THRESHOLD
    }
}

/// Item learning status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStatus {
    New,
    Learning,
    Review,
}

impl Default for LearningStatus {
    fn default() -> Self {
        Self::New
    }
}

/// Per-user, per-item learning state.
///
/// Timestamps are unix seconds; `next_due_at == 0` means the item has
/// never been scheduled, `last_reviewed_at == 0` means never graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningState {
    pub ease_factor: f64,
    pub repetition: u32,
    pub interval_days: u32,
    pub next_due_at: i64,
    pub last_grade: u8,
    pub last_reviewed_at: i64,
    pub status: LearningStatus,
}

impl Default for LearningState {
    fn default() -> Self {
        Self {
            ease_factor: 2.5,
            repetition: 0,
            interval_days: 1,
            next_due_at: 0,
            last_grade: 0,
            last_reviewed_at: 0,
            status: LearningStatus::New,
        }
    }
}

impl LearningState {
    /// Whether the item is due for review at `now`.
    ///
    /// A never-scheduled state (`next_due_at == 0`) is not considered
    /// due: new items enter through the learning path, not the review
    /// path.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_due_at > 0 && now.timestamp() >= self.next_due_at
    }

    /// Whether the item has been scheduled at least once.
    pub fn is_scheduled(&self) -> bool {
        self.next_due_at > 0
    }
}

/// Active session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Review,
    Learning,
}

/// Per-user delivery/session state.
///
/// `busy` means exactly one notification has been delivered and is
/// awaiting an answer; `pending_queue` holds items that became due
/// while busy, FIFO, without duplicates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub busy: bool,
    #[serde(default)]
    pub pending_queue: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SessionMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_item: Option<ItemId>,
}

/// Per-user daily learning counter.
///
/// `date_key` is a `YYYY-MM-DD` string in the engine's configured
/// time zone; a mismatch with "today" means the counter is stale and
/// must be reset before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounter {
    pub date_key: String,
    pub learned_count: u32,
    pub daily_goal: u32,
}

impl DailyCounter {
    pub const DEFAULT_GOAL: u32 = 5;

    /// Fresh counter for the given day, preserving an existing goal.
    pub fn fresh(date_key: String, daily_goal: u32) -> Self {
        Self {
            date_key,
            learned_count: 0,
            daily_goal,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.daily_goal.saturating_sub(self.learned_count)
    }

    pub fn goal_reached(&self) -> bool {
        self.learned_count >= self.daily_goal
    }
}

impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date_key: String::new(),
            learned_count: 0,
            daily_goal: Self::DEFAULT_GOAL,
        }
    }
}
