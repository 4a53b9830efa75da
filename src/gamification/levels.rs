//! XP level thresholds.
//!
//! Levels come from a fixed ascending table; index 0 is the floor of level 1.
//! The table has no formula beyond its last entry, so the level is capped at
//! [`MAX_LEVEL`]. At the cap there is no next threshold: the remaining XP is
//! 0 and progress reads 100%.

use serde::Serialize;

/// Cumulative XP needed for each level, starting at level 1.
pub const LEVEL_THRESHOLDS: [u64; 11] = [
    0, 100, 250, 500, 1000, 1750, 2750, 4000, 5500, 7500, 10000,
];

/// Highest reachable level.
pub const MAX_LEVEL: u32 = LEVEL_THRESHOLDS.len() as u32;

/// Level for a cumulative XP total.
pub fn level_for_xp(total_xp: u64) -> u32 {
    LEVEL_THRESHOLDS
        .iter()
        .rposition(|&threshold| threshold <= total_xp)
        .map(|i| i as u32 + 1)
        .unwrap_or(1)
}

/// XP at which `level` starts, `None` beyond the table.
pub fn level_floor(level: u32) -> Option<u64> {
    let index = level.checked_sub(1)? as usize;
    LEVEL_THRESHOLDS.get(index).copied()
}

/// XP at which the level after `level` starts, `None` at the cap.
pub fn next_threshold(level: u32) -> Option<u64> {
    LEVEL_THRESHOLDS.get(level as usize).copied()
}

/// XP still needed to leave `level`. 0 at the cap.
pub fn xp_to_next_level(total_xp: u64, level: u32) -> u64 {
    next_threshold(level)
        .map(|next| next.saturating_sub(total_xp))
        .unwrap_or(0)
}

/// Progress through `level` in percent, clamped to 0..=100.
pub fn progress_percent(total_xp: u64, level: u32) -> f64 {
    let level = level.clamp(1, MAX_LEVEL);
    let (Some(floor), Some(next)) = (level_floor(level), next_threshold(level)) else {
        return 100.0;
    };

    let span = next.saturating_sub(floor);
    if span == 0 {
        return 100.0;
    }
    let gained = total_xp.saturating_sub(floor) as f64;
    (gained / span as f64 * 100.0).clamp(0.0, 100.0)
}

/// Snapshot of where a profile sits in the level table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: u32,
    pub total_xp: u64,
    /// XP at which the current level started
    pub floor: u64,
    /// XP at which the next level starts, `None` at the cap
    pub next_threshold: Option<u64>,
    pub xp_to_next: u64,
    pub percent: f64,
}

impl LevelProgress {
    /// Progress for a stored level and XP total.
    pub fn new(total_xp: u64, level: u32) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        Self {
            level,
            total_xp,
            floor: level_floor(level).unwrap_or(0),
            next_threshold: next_threshold(level),
            xp_to_next: xp_to_next_level(total_xp, level),
            percent: progress_percent(total_xp, level),
        }
    }

    /// Whether the level cap has been reached.
    pub fn is_max_level(&self) -> bool {
        self.next_threshold.is_none()
    }
}
