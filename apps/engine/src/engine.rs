//! Engine orchestration.
//!
//! Ties the calculator, store, delivery queue, scheduler, and daily
//! limiter together behind per-user critical sections. This is the
//! surface a chat frontend drives: grade answers, start sessions,
//! add items, recover on boot.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use srs_core::{
    due_items, format_interval, new_items, stats, Grade, Item, ItemId, LearningStats,
    LearningStatus, SessionMode, Sm2, UserId,
};

use crate::config::EngineConfig;
use crate::daily::{DailyLimiter, DailyStats};
use crate::error::{EngineError, Result};
use crate::locks::UserLocks;
use crate::queue::DeliveryQueue;
use crate::scheduler::ReviewScheduler;
use crate::store::ProgressStore;
use crate::transport::{self, NotificationTransport};

/// Result of grading one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOutcome {
    pub interval_days: u32,
    pub next_due_at: i64,
    /// Next queued item delivered right after this answer, if any.
    pub next_item: Option<ItemId>,
}

/// Combined per-user status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserOverview {
    pub learning: LearningStats,
    pub daily: DailyStats,
    pub queued: usize,
}

#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn ProgressStore>,
    transport: Arc<dyn NotificationTransport>,
    queue: DeliveryQueue,
    scheduler: ReviewScheduler,
    limiter: DailyLimiter,
    locks: UserLocks,
    sm2: Sm2,
    pacing_delay: Duration,
}

impl Engine {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        transport: Arc<dyn NotificationTransport>,
        config: &EngineConfig,
    ) -> Self {
        let locks = UserLocks::new();
        let queue = DeliveryQueue::new(Arc::clone(&store));
        let scheduler = ReviewScheduler::new(
            Arc::clone(&store),
            queue.clone(),
            Arc::clone(&transport),
            locks.clone(),
        );
        let limiter = DailyLimiter::new(
            Arc::clone(&store),
            config.zone(),
            config.default_daily_goal,
        );
        Self {
            store,
            transport,
            queue,
            scheduler,
            limiter,
            locks,
            sm2: Sm2::default(),
            pacing_delay: config.pacing_delay,
        }
    }

    pub fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    pub fn limiter(&self) -> &DailyLimiter {
        &self.limiter
    }

    /// Grade the user's answer for one item.
    ///
    /// One read at the top captures whether the item was still new;
    /// that flag drives the daily counter, so the store is never
    /// re-read mid-flow. Persists the new state, re-arms the review
    /// timer (replacing any pending one), then pops the delivery
    /// queue and pushes the next item out after the pacing delay.
    pub async fn grade(&self, user: UserId, item: ItemId, grade: u8) -> Result<GradeOutcome> {
        let grade =
            Grade::new(grade).map_err(|e| EngineError::Validation(e.to_string()))?;

        let guard = self.locks.lock(user).await;

        let state = self.store.learning_state(user, item).await?.ok_or_else(|| {
            EngineError::NotFound(format!("no learning state for user {user}, item {item}"))
        })?;
        let was_new = state.status == LearningStatus::New;

        let now = Utc::now();
        let review = self.sm2.compute_next(&state, grade, now);
        self.store
            .set_learning_state(user, item, review.state.clone())
            .await?;

        if was_new && grade.is_pass() {
            self.limiter.record_learned_at(user, now).await?;
        }

        self.scheduler
            .schedule_review(user, item, review.state.next_due_at);
        tracing::info!(
            user = %user,
            item = %item,
            grade = grade.value(),
            next_in = %format_interval(review.interval_days),
            "graded item"
        );

        let next_item = self.queue.answered(user).await?;
        drop(guard);

        if let Some(next) = next_item {
            if !self.pacing_delay.is_zero() {
                tokio::time::sleep(self.pacing_delay).await;
            }
            transport::deliver_item(&self.store, &self.transport, user, next).await?;
        }

        Ok(GradeOutcome {
            interval_days: review.interval_days,
            next_due_at: review.state.next_due_at,
            next_item,
        })
    }

    /// Start a review session: drop any queued notifications and
    /// return the items currently due, oldest first by id.
    pub async fn start_review_session(&self, user: UserId) -> Result<Vec<ItemId>> {
        let _guard = self.locks.lock(user).await;

        self.queue.reset(user).await?;
        let states = self.store.learning_states(user).await?;
        let due = due_items(&states, Utc::now());

        let mut session = self.store.session_state(user).await?;
        session.mode = Some(SessionMode::Review);
        self.store.set_session_state(user, session).await?;

        tracing::info!(user = %user, due = due.len(), "review session started");
        Ok(due)
    }

    /// Start a learning session: returns a batch of never-studied
    /// items capped by today's remaining goal, or an empty batch when
    /// the goal is reached or nothing new is left.
    pub async fn start_learning_session(&self, user: UserId) -> Result<Vec<ItemId>> {
        let _guard = self.locks.lock(user).await;

        let states = self.store.learning_states(user).await?;
        let available = new_items(&states, usize::MAX);
        let now = Utc::now();
        let daily = self
            .limiter
            .daily_stats_at(user, available.len() as u32, now)
            .await?;

        if !daily.can_learn_more {
            tracing::info!(
                user = %user,
                learned = daily.learned_today,
                goal = daily.daily_goal,
                available = daily.available_new,
                "learning session refused"
            );
            return Ok(Vec::new());
        }

        self.queue.reset(user).await?;
        let batch = new_items(&states, daily.remaining_today as usize);

        let mut session = self.store.session_state(user).await?;
        session.mode = Some(SessionMode::Learning);
        self.store.set_session_state(user, session).await?;

        tracing::info!(user = %user, batch = batch.len(), "learning session started");
        Ok(batch)
    }

    /// End the active session; the busy flag and queue are left for
    /// the delivery machinery to drain.
    pub async fn end_session(&self, user: UserId) -> Result<()> {
        let _guard = self.locks.lock(user).await;

        let mut session = self.store.session_state(user).await?;
        session.mode = None;
        session.current_item = None;
        self.store.set_session_state(user, session).await?;

        tracing::info!(user = %user, "session ended");
        Ok(())
    }

    /// Seed default learning state for every known item (first
    /// contact with a user).
    pub async fn onboard_user(&self, user: UserId) -> Result<usize> {
        let _guard = self.locks.lock(user).await;

        let items = self.store.list_items().await?;
        for item in &items {
            self.store.init_item_state(user, item.id).await?;
        }
        tracing::info!(user = %user, items = items.len(), "onboarded user");
        Ok(items.len())
    }

    /// Add a new item and make it learnable for every known user.
    pub async fn add_item(&self, front: &str, back: &str) -> Result<Item> {
        let item = self.store.add_item(front, back).await?;
        for user in self.store.list_users().await? {
            let _guard = self.locks.lock(user).await;
            self.store.init_item_state(user, item.id).await?;
        }
        Ok(item)
    }

    /// Combined status snapshot for display.
    pub async fn overview(&self, user: UserId) -> Result<UserOverview> {
        let _guard = self.locks.lock(user).await;

        let states = self.store.learning_states(user).await?;
        let now = Utc::now();
        let learning = stats(&states, now);
        let daily = self
            .limiter
            .daily_stats_at(user, learning.new as u32, now)
            .await?;
        let queued = self.store.session_state(user).await?.pending_queue.len();

        Ok(UserOverview {
            learning,
            daily,
            queued,
        })
    }

    /// Startup recovery: rebuild every user's schedule from the
    /// store.
    pub async fn recover(&self) -> Result<usize> {
        self.scheduler.recover_all().await
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}
