//! SM-2 spaced repetition algorithm.
//!
//! Classic SuperMemo 2 with the 0-5 grade scale and daily intervals.

use chrono::{DateTime, Utc};

use super::Review;
use crate::types::{Grade, LearningState, LearningStatus};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// SM-2 calculator with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after the first successful review.
    pub first_interval: u32,
    /// Interval after the second successful review.
    pub second_interval: u32,
    /// Stand-in previous interval when a state reaches repetition >= 3
    /// without one recorded (inherited quirk, kept for compatibility).
    pub fallback_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            first_interval: 1,
            second_interval: 6,
            fallback_interval: 6,
        }
    }
}

impl Sm2 {
    /// Initial state for an item that has never been graded.
    pub fn initial_state(&self) -> LearningState {
        LearningState {
            ease_factor: self.initial_ease,
            ..Default::default()
        }
    }

    /// Compute the state after grading. Pure: `now` is used only to
    /// stamp `last_reviewed_at` and derive `next_due_at`.
    pub fn compute_next(&self, state: &LearningState, grade: Grade, now: DateTime<Utc>) -> Review {
        let g = f64::from(grade.value());

        // EF' = EF + (0.1 - (5-g) * (0.08 + (5-g) * 0.02)), floored.
        let ease = state.ease_factor + (0.1 - (5.0 - g) * (0.08 + (5.0 - g) * 0.02));
        let ease = ease.max(self.minimum_ease);

        let (repetition, interval_days, status) = if !grade.is_pass() {
            // Lapse: streak and interval reset.
            (0, 1, LearningStatus::Learning)
        } else {
            let repetition = state.repetition + 1;
            match repetition {
                1 => (repetition, self.first_interval, LearningStatus::Learning),
                2 => (repetition, self.second_interval, LearningStatus::Learning),
                _ => {
                    let previous = if state.interval_days == 0 {
                        self.fallback_interval
                    } else {
                        state.interval_days
                    };
                    let grown = (f64::from(previous) * ease).round() as u32;
                    (repetition, grown.max(1), LearningStatus::Review)
                }
            }
        };

        let reviewed_at = now.timestamp();
        let next_due_at = reviewed_at + i64::from(interval_days) * SECONDS_PER_DAY;

        Review {
            state: LearningState {
                ease_factor: (ease * 100.0).round() / 100.0,
                repetition,
                interval_days,
                next_due_at,
                last_grade: grade.value(),
                last_reviewed_at: reviewed_at,
                status,
            },
            interval_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grade(value: u8) -> Grade {
        Grade::new(value).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn fresh_item_graded_four() {
        let sm2 = Sm2::default();
        let result = sm2.compute_next(&sm2.initial_state(), grade(4), now());
        assert_eq!(result.state.repetition, 1);
        assert_eq!(result.interval_days, 1);
        assert_eq!(result.state.status, LearningStatus::Learning);
    }

    #[test]
    fn second_pass_gets_six_days() {
        let sm2 = Sm2::default();
        let state = LearningState {
            ease_factor: 2.5,
            repetition: 1,
            interval_days: 1,
            ..Default::default()
        };
        let result = sm2.compute_next(&state, grade(5), now());
        assert_eq!(result.state.repetition, 2);
        assert_eq!(result.interval_days, 6);
        assert_eq!(result.state.status, LearningStatus::Learning);
    }

    #[test]
    fn third_pass_grows_by_ease() {
        let sm2 = Sm2::default();
        let state = LearningState {
            ease_factor: 2.5,
            repetition: 2,
            interval_days: 6,
            ..Default::default()
        };
        let result = sm2.compute_next(&state, grade(4), now());
        // grade 4 leaves EF at 2.5: 2.5 + (0.1 - 1*0.1) = 2.5
        assert_eq!(result.state.ease_factor, 2.5);
        assert_eq!(result.interval_days, 15);
        assert_eq!(result.state.status, LearningStatus::Review);
    }

    #[test]
    fn lapse_resets_streak_and_interval() {
        let sm2 = Sm2::default();
        let state = LearningState {
            ease_factor: 2.5,
            repetition: 4,
            interval_days: 30,
            status: LearningStatus::Review,
            ..Default::default()
        };
        for g in 0..3 {
            let result = sm2.compute_next(&state, grade(g), now());
            assert_eq!(result.state.repetition, 0);
            assert_eq!(result.interval_days, 1);
            assert_eq!(result.state.status, LearningStatus::Learning);
        }
    }

    #[test]
    fn ease_never_drops_below_minimum() {
        let sm2 = Sm2::default();
        let mut state = sm2.initial_state();
        // Repeated worst grades drive EF to the floor, never past it.
        for _ in 0..10 {
            let result = sm2.compute_next(&state, grade(0), now());
            assert!(result.state.ease_factor >= sm2.minimum_ease);
            state = result.state;
        }
        assert_eq!(state.ease_factor, 1.3);
    }

    #[test]
    fn intervals_grow_monotonically_on_pass() {
        let sm2 = Sm2::default();
        let mut state = LearningState {
            ease_factor: 2.5,
            repetition: 2,
            interval_days: 6,
            ..Default::default()
        };
        let mut previous = state.interval_days;
        for _ in 0..6 {
            let result = sm2.compute_next(&state, grade(3), now());
            assert!(result.interval_days >= previous);
            previous = result.interval_days;
            state = result.state;
        }
    }

    #[test]
    fn missing_previous_interval_falls_back_to_six() {
        let sm2 = Sm2::default();
        let state = LearningState {
            ease_factor: 2.5,
            repetition: 2,
            interval_days: 0,
            ..Default::default()
        };
        let result = sm2.compute_next(&state, grade(4), now());
        assert_eq!(result.interval_days, 15);
    }

    #[test]
    fn ease_is_stored_rounded() {
        let sm2 = Sm2::default();
        // grade 3: EF delta is 0.1 - 2*(0.08 + 2*0.02) = -0.14
        let result = sm2.compute_next(&sm2.initial_state(), grade(3), now());
        assert_eq!(result.state.ease_factor, 2.36);
    }

    #[test]
    fn next_due_is_interval_days_out() {
        let sm2 = Sm2::default();
        let at = now();
        let result = sm2.compute_next(&sm2.initial_state(), grade(4), at);
        assert_eq!(result.state.next_due_at, at.timestamp() + SECONDS_PER_DAY);
        assert_eq!(result.state.last_reviewed_at, at.timestamp());
    }
}
