//! Spaced repetition scheduling.

pub mod sm2;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::{ItemId, LearningState, LearningStatus};

/// Result of grading an item.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub state: LearningState,
    pub interval_days: u32,
}

/// Items due for review at `now`, in stable (id) order.
pub fn due_items(states: &HashMap<ItemId, LearningState>, now: DateTime<Utc>) -> Vec<ItemId> {
    let mut due: Vec<ItemId> = states
        .iter()
        .filter(|(_, state)| state.is_due(now))
        .map(|(id, _)| *id)
        .collect();
    due.sort();
    due
}

/// Items never studied yet, in stable (id) order, up to `limit`.
pub fn new_items(states: &HashMap<ItemId, LearningState>, limit: usize) -> Vec<ItemId> {
    let mut fresh: Vec<ItemId> = states
        .iter()
        .filter(|(_, state)| state.status == LearningStatus::New)
        .map(|(id, _)| *id)
        .collect();
    fresh.sort();
    fresh.truncate(limit);
    fresh
}

/// Aggregate learning statistics for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LearningStats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub due: usize,
}

/// Count items per status plus how many are currently due.
pub fn stats(states: &HashMap<ItemId, LearningState>, now: DateTime<Utc>) -> LearningStats {
    let mut out = LearningStats {
        total: states.len(),
        ..Default::default()
    };
    for state in states.values() {
        match state.status {
            LearningStatus::New => out.new += 1,
            LearningStatus::Learning => out.learning += 1,
            LearningStatus::Review => out.review += 1,
        }
        if state.is_due(now) {
            out.due += 1;
        }
    }
    out
}
