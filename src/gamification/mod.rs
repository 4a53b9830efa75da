//! Progress tracking module.
//!
//! Provides the XP event log, profile, level table, streaks, badges and
//! quests, tied together by [`GamificationEngine`].

pub mod badges;
pub mod engine;
pub mod events;
pub mod levels;
pub mod profile;
pub mod quests;
pub mod streak;
pub mod types;

// Re-export commonly used types
pub use engine::{ActivityOutcome, DailySummary, EngineSettings, GamificationEngine};
pub use levels::{LevelProgress, LEVEL_THRESHOLDS, MAX_LEVEL};
pub use types::*;
