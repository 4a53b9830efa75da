//! Badge catalog and unlock checking.
//!
//! Unlocks are one-way: once a badge is unlocked it stays unlocked and its
//! `unlocked_at` never moves, whatever happens to the counters afterwards.

use chrono::{DateTime, Utc};

use super::types::{default_badges, Badge, Profile};
use crate::storage::{DocumentKind, DocumentStore};

/// Badge manager.
pub struct BadgeManager<'a> {
    docs: &'a DocumentStore,
}

impl<'a> BadgeManager<'a> {
    /// Create a new badge manager.
    pub fn new(docs: &'a DocumentStore) -> Self {
        Self { docs }
    }

    /// Get the full catalog with unlock state.
    ///
    /// The default catalog is persisted on first access. A stored catalog is
    /// reconciled with the built-in definitions by id.
    pub fn badges(&self) -> Vec<Badge> {
        match self.docs.load::<Vec<Badge>>(DocumentKind::Badges) {
            Some(stored) => {
                let (badges, changed) = reconcile(stored);
                if changed {
                    tracing::debug!("Badge catalog updated to current definitions");
                    self.docs.save(DocumentKind::Badges, &badges);
                }
                badges
            }
            None => {
                let badges = default_badges();
                self.docs.save(DocumentKind::Badges, &badges);
                badges
            }
        }
    }

    /// Badges unlocked so far.
    pub fn unlocked(&self) -> Vec<Badge> {
        self.badges().into_iter().filter(|b| b.unlocked).collect()
    }

    /// Unlock every locked badge whose requirement `profile` now meets.
    ///
    /// Returns the newly unlocked badges; the catalog is only written when
    /// that list is non-empty.
    pub fn check_unlocks(&self, profile: &Profile, now: DateTime<Utc>) -> Vec<Badge> {
        let mut badges = self.badges();
        let mut newly_unlocked = Vec::new();

        for badge in badges.iter_mut().filter(|b| !b.unlocked) {
            if badge.category.counter(profile) >= badge.requirement {
                badge.unlocked = true;
                badge.unlocked_at = Some(now);
                tracing::info!("Badge unlocked: {} ({})", badge.name, badge.id);
                newly_unlocked.push(badge.clone());
            }
        }

        if !newly_unlocked.is_empty() {
            self.docs.save(DocumentKind::Badges, &badges);
        }

        newly_unlocked
    }
}

/// Align a stored catalog with the built-in definitions.
///
/// Definitions come from the built-in catalog, unlock state from storage.
/// Unknown ids are dropped, missing ones are added locked.
fn reconcile(stored: Vec<Badge>) -> (Vec<Badge>, bool) {
    let mut changed = stored.len() != default_badges().len();

    let badges = default_badges()
        .into_iter()
        .map(|mut definition| {
            match stored.iter().find(|b| b.id == definition.id) {
                Some(saved) => {
                    definition.unlocked = saved.unlocked;
                    definition.unlocked_at = saved.unlocked_at;
                    if *saved != definition {
                        changed = true;
                    }
                }
                None => changed = true,
            }
            definition
        })
        .collect();

    (badges, changed)
}
