//! ONX Progress - gamification engine for sales outreach
//!
//! Tracks XP, levels, daily streaks, badges and rotating quests for the
//! single local user of a sales dashboard. All state is kept as JSON
//! documents in a pluggable key-value store (SQLite or memory).

pub mod clock;
pub mod gamification;
pub mod storage;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use gamification::GamificationEngine;
pub use storage::config::AppConfig;
