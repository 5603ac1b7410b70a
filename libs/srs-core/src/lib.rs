//! Core spaced-repetition library shared by the scheduling engine.
//!
//! Provides:
//! - SM-2 interval calculator (0-5 grade scale, daily intervals)
//! - Due/new item selection and per-user statistics
//! - Interval formatting for display
//! - Shared types (Item, LearningState, SessionState, DailyCounter)

pub mod algorithm;
pub mod error;
pub mod interval;
pub mod types;

pub use algorithm::{due_items, new_items, stats, sm2::Sm2, LearningStats, Review};
pub use error::{CoreError, Result};
pub use interval::format_interval;
pub use types::{
    DailyCounter, Grade, Item, ItemId, LearningState, LearningStatus, SessionMode, SessionState,
    UserId,
};
