//! Profile persistence.

use super::levels::level_for_xp;
use super::types::{Profile, ProfileUpdate, StatKind};
use crate::storage::{DocumentKind, DocumentStore};

/// Reads and writes the profile document.
pub struct ProfileStore<'a> {
    docs: &'a DocumentStore,
}

impl<'a> ProfileStore<'a> {
    /// Create a profile store over a document store.
    pub fn new(docs: &'a DocumentStore) -> Self {
        Self { docs }
    }

    /// Get the stored profile, creating and persisting defaults when absent.
    pub fn get(&self) -> Profile {
        if let Some(profile) = self.docs.load(DocumentKind::Profile) {
            return profile;
        }

        let profile = Profile::default();
        self.docs.save(DocumentKind::Profile, &profile);
        profile
    }

    /// Merge `update` into the stored profile and persist the result.
    ///
    /// The level is re-derived from the XP total whenever the update carries
    /// one, overriding any level in the same update.
    pub fn update(&self, update: ProfileUpdate) -> Profile {
        let mut profile = self.get();

        if let Some(level) = update.level {
            profile.level = level.max(1);
        }
        if let Some(current_streak) = update.current_streak {
            profile.current_streak = current_streak;
        }
        if let Some(longest_streak) = update.longest_streak {
            profile.longest_streak = longest_streak;
        }
        if let Some(date) = update.last_active_date {
            profile.last_active_date = Some(date);
        }
        if let Some(stats) = update.stats {
            profile.stats = stats;
        }
        if let Some(total_xp) = update.total_xp {
            profile.total_xp = total_xp;
            profile.level = level_for_xp(total_xp);
        }

        self.docs.save(DocumentKind::Profile, &profile);
        profile
    }

    /// Add `by` to one activity counter.
    pub fn increment_stat(&self, stat: StatKind, by: u32) -> Profile {
        let mut stats = self.get().stats;
        stats.increment(stat, by);
        tracing::debug!("{} is now {}", stat.as_str(), stats.get(stat));

        self.update(ProfileUpdate {
            stats: Some(stats),
            ..Default::default()
        })
    }

    /// Credit XP to the profile.
    pub fn add_xp(&self, xp: u64) -> Profile {
        let profile = self.get();
        self.update(ProfileUpdate::total_xp(profile.total_xp.saturating_add(xp)))
    }
}
