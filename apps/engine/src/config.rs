//! Engine configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory for the JSON document store.
    pub data_dir: PathBuf,
    /// Fixed offset (hours east of UTC) defining the local study day.
    pub tz_offset_hours: i32,
    /// Default daily goal for users without a stored one.
    pub default_daily_goal: u32,
    /// Cosmetic pause between consecutive deliveries to one user.
    pub pacing_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            tz_offset_hours: 5,
            default_daily_goal: 5,
            pacing_delay: Duration::from_secs(2),
        }
    }
}

impl EngineConfig {
    /// Read configuration from `DATA_DIR`, `TZ_OFFSET_HOURS`,
    /// `DAILY_GOAL`, and `PACING_DELAY_SECS`, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            tz_offset_hours: std::env::var("TZ_OFFSET_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|h: &i32| (-23..=23).contains(h))
                .unwrap_or(defaults.tz_offset_hours),
            default_daily_goal: std::env::var("DAILY_GOAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|g| *g >= 1)
                .unwrap_or(defaults.default_daily_goal),
            pacing_delay: std::env::var("PACING_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.pacing_delay),
        }
    }

    /// The configured study-day time zone. An out-of-range offset
    /// falls back to UTC rather than panicking.
    pub fn zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.tz_offset_hours * 3600).unwrap_or_else(|| {
            tracing::warn!(
                hours = self.tz_offset_hours,
                "offset out of range, falling back to UTC"
            );
            Utc.fix()
        })
    }
}
