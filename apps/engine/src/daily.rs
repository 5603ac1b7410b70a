//! Daily learning limiter.
//!
//! Tracks how many new items a user has started today and gates how
//! many more may be offered. "Today" is a calendar date in one fixed,
//! configured time zone; the counter resets lazily the first time it
//! is read on a new day (the stored goal is preserved).

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use srs_core::{DailyCounter, UserId};

use crate::error::Result;
use crate::store::ProgressStore;

/// Snapshot of a user's daily progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyStats {
    pub learned_today: u32,
    pub daily_goal: u32,
    pub remaining_today: u32,
    pub available_new: u32,
    pub goal_reached: bool,
    pub can_learn_more: bool,
}

#[derive(Clone)]
pub struct DailyLimiter {
    store: Arc<dyn ProgressStore>,
    zone: FixedOffset,
    default_goal: u32,
}

impl DailyLimiter {
    pub fn new(store: Arc<dyn ProgressStore>, zone: FixedOffset, default_goal: u32) -> Self {
        Self {
            store,
            zone,
            default_goal: default_goal.max(1),
        }
    }

    /// Calendar date key (`YYYY-MM-DD`) for `now` in the configured
    /// zone.
    pub fn day_key(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.zone).format("%Y-%m-%d").to_string()
    }

    /// Read the counter, resetting it first if the stored date key is
    /// not today. The reset is persisted before the counter is
    /// returned, so two reads on the same day always agree.
    pub async fn counter_at(&self, user: UserId, now: DateTime<Utc>) -> Result<DailyCounter> {
        let today = self.day_key(now);
        let counter = self.store.daily_counter(user).await?;

        if counter.date_key == today {
            return Ok(counter);
        }

        let goal = if counter.daily_goal == 0 {
            self.default_goal
        } else {
            counter.daily_goal
        };
        let fresh = DailyCounter::fresh(today.clone(), goal);
        self.store.set_daily_counter(user, fresh.clone()).await?;
        tracing::info!(user = %user, day = %today, "daily counter reset for new day");
        Ok(fresh)
    }

    pub async fn counter(&self, user: UserId) -> Result<DailyCounter> {
        self.counter_at(user, Utc::now()).await
    }

    /// Record one newly learned item. Counts every call; the caller
    /// must invoke it exactly once per item that left the `new`
    /// status.
    pub async fn record_learned_at(&self, user: UserId, now: DateTime<Utc>) -> Result<()> {
        let mut counter = self.counter_at(user, now).await?;
        counter.learned_count += 1;
        tracing::info!(
            user = %user,
            learned = counter.learned_count,
            goal = counter.daily_goal,
            "recorded newly learned item"
        );
        self.store.set_daily_counter(user, counter).await?;
        Ok(())
    }

    pub async fn record_learned(&self, user: UserId) -> Result<()> {
        self.record_learned_at(user, Utc::now()).await
    }

    pub async fn remaining_at(&self, user: UserId, now: DateTime<Utc>) -> Result<u32> {
        Ok(self.counter_at(user, now).await?.remaining())
    }

    pub async fn can_learn_more_at(
        &self,
        user: UserId,
        available_new: u32,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let counter = self.counter_at(user, now).await?;
        Ok(available_new > 0 && counter.learned_count < counter.daily_goal)
    }

    /// Combined snapshot used by session flows and status displays.
    pub async fn daily_stats_at(
        &self,
        user: UserId,
        available_new: u32,
        now: DateTime<Utc>,
    ) -> Result<DailyStats> {
        let counter = self.counter_at(user, now).await?;
        Ok(DailyStats {
            learned_today: counter.learned_count,
            daily_goal: counter.daily_goal,
            remaining_today: counter.remaining(),
            available_new,
            goal_reached: counter.goal_reached(),
            can_learn_more: available_new > 0 && !counter.goal_reached(),
        })
    }

    pub async fn daily_stats(&self, user: UserId, available_new: u32) -> Result<DailyStats> {
        self.daily_stats_at(user, available_new, Utc::now()).await
    }
}
