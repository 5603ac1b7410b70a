//! Spaced-repetition scheduling and queueing engine.
//!
//! Decides when each learned item becomes due again (SM-2 intervals
//! from `srs-core`), arms one timer per pending (user, item) review,
//! and funnels due notifications through a per-user single-delivery
//! queue so a busy user never sees two cards at once. New-item intake
//! is capped by a per-day counter that resets on day rollover.

pub mod config;
pub mod daily;
pub mod engine;
pub mod error;
pub mod locks;
pub mod queue;
pub mod scheduler;
pub mod store;
pub mod transport;

pub use config::EngineConfig;
pub use daily::{DailyLimiter, DailyStats};
pub use engine::{Engine, GradeOutcome, UserOverview};
pub use error::{EngineError, Result, StoreError, TransportError};
pub use queue::{DeliveryQueue, Offer};
pub use scheduler::{RecoverySummary, ReviewScheduler};
pub use store::{JsonStore, ProgressStore};
pub use transport::{LogTransport, NotificationTransport};
