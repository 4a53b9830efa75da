//! Day-grained activity streaks.
//!
//! Streaks compare calendar dates only. Time of day never matters, so an
//! action at 23:59 followed by one at 00:01 extends the streak.

use chrono::NaiveDate;

use super::types::Profile;

/// What a recorded activity did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Already active today
    Unchanged,
    /// Last activity was yesterday
    Extended,
    /// First activity ever, or a gap of two or more days
    Started,
}

/// Apply an activity on `today` to the profile's streak fields.
pub fn apply_activity(profile: &mut Profile, today: NaiveDate) -> StreakChange {
    let change = match profile.last_active_date {
        Some(last) if last == today => return StreakChange::Unchanged,
        Some(last) if last.succ_opt() == Some(today) => {
            profile.current_streak = profile.current_streak.saturating_add(1);
            StreakChange::Extended
        }
        _ => {
            profile.current_streak = 1;
            StreakChange::Started
        }
    };

    profile.last_active_date = Some(today);
    profile.longest_streak = profile.longest_streak.max(profile.current_streak);
    change
}

/// Streak as it would display on `today`: 0 once a day has been skipped.
pub fn visible_streak(profile: &Profile, today: NaiveDate) -> u32 {
    match profile.last_active_date {
        Some(last) if last == today || last.succ_opt() == Some(today) => profile.current_streak,
        _ => 0,
    }
}
