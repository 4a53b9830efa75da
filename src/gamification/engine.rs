//! Progress engine.
//!
//! Owns the document store and the clock and runs every operation as a
//! synchronous read-modify-write. Storage faults never reach the caller;
//! they are logged by the document store and the operation continues on
//! defaults.

use chrono::NaiveDate;
use crossbeam::channel::Receiver;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::badges::BadgeManager;
use super::events::{EventLog, DEFAULT_EVENT_CAPACITY};
use super::levels::LevelProgress;
use super::profile::ProfileStore;
use super::quests::QuestManager;
use super::streak::{self, StreakChange};
use super::types::{Activity, Badge, Profile, ProfileUpdate, Quest, StatKind, XpEvent, XpEventType};
use crate::clock::{Clock, SystemClock};
use crate::storage::{
    AppConfig, DocumentKeys, DocumentStore, KeyValueStore, MemoryStore, SqliteStore,
    StorageBackend, StorageChange, StorageError,
};

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Key prefix for the four documents
    pub namespace: String,
    /// Events kept in the log
    pub event_capacity: usize,
    /// Daily XP goal reported by [`GamificationEngine::daily_summary`]
    pub daily_xp_target: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            namespace: "onx.gamification".to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            daily_xp_target: 100,
        }
    }
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            namespace: config.storage.namespace.clone(),
            event_capacity: config.events.capacity,
            daily_xp_target: config.goals.daily_xp_target,
        }
    }
}

/// What a logged activity produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityOutcome {
    pub event: XpEvent,
    pub unlocked_badges: Vec<Badge>,
    pub completed_quests: Vec<Quest>,
    pub level_before: u32,
    pub level_after: u32,
}

impl ActivityOutcome {
    /// Whether the activity raised the level.
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Today's totals for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Sum of XP of events logged today
    pub xp_earned: u64,
    pub target: u64,
    pub events: usize,
    /// Streak as of today, 0 once a day was missed
    pub streak: u32,
}

impl DailySummary {
    pub fn target_met(&self) -> bool {
        self.xp_earned >= self.target
    }
}

/// XP, streak, badge and quest bookkeeping over a key-value backend.
pub struct GamificationEngine {
    docs: DocumentStore,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

impl GamificationEngine {
    /// Create an engine over `backend`.
    pub fn new(
        backend: Box<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
    ) -> Self {
        let keys = DocumentKeys::new(&settings.namespace);
        Self {
            docs: DocumentStore::new(backend, keys),
            clock,
            settings,
        }
    }

    /// Engine over a fresh in-memory store.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(Box::new(MemoryStore::new()), clock, EngineSettings::default())
    }

    /// Engine with the backend, clock and settings described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, StorageError> {
        let backend: Box<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::Sqlite => Box::new(SqliteStore::open(&config.database_path())?),
            StorageBackend::Memory => Box::new(MemoryStore::new()),
        };

        let clock: Arc<dyn Clock> = match config.clock.utc_offset_minutes {
            Some(minutes) => Arc::new(SystemClock::with_offset_minutes(minutes)),
            None => Arc::new(SystemClock::new()),
        };

        tracing::info!("Progress engine using {} storage", config.storage.backend);
        Ok(Self::new(backend, clock, EngineSettings::from(config)))
    }

    /// Clock used for timestamps and calendar dates.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Document store backing this engine.
    pub fn documents(&self) -> &DocumentStore {
        &self.docs
    }

    /// Receive a notice after every document write.
    pub fn subscribe(&self) -> Receiver<StorageChange> {
        self.docs.subscribe()
    }

    fn profiles(&self) -> ProfileStore<'_> {
        ProfileStore::new(&self.docs)
    }

    fn event_log(&self) -> EventLog<'_> {
        EventLog::new(&self.docs, self.settings.event_capacity)
    }

    fn badge_manager(&self) -> BadgeManager<'_> {
        BadgeManager::new(&self.docs)
    }

    fn quest_manager(&self) -> QuestManager<'_> {
        QuestManager::new(&self.docs, self.clock.as_ref())
    }

    // ========== Event Log ==========

    /// Record a point-scoring action.
    ///
    /// Appends the event, credits its XP, advances the streak, re-derives
    /// the level and unlocks any badges now earned.
    pub fn record(&self, kind: XpEventType, description: Option<&str>) -> XpEvent {
        self.record_event(kind, description).0
    }

    fn record_event(&self, kind: XpEventType, description: Option<&str>) -> (XpEvent, Vec<Badge>) {
        let now = self.clock.now();
        let event = XpEvent::new(kind, description, now);
        self.event_log().append(event.clone());

        let profiles = self.profiles();
        let mut profile = profiles.get();
        let level_before = profile.level;

        let change = streak::apply_activity(&mut profile, self.clock.local_date(now));
        if change == StreakChange::Extended {
            tracing::debug!("Streak extended to {} days", profile.current_streak);
        }

        let profile = profiles.update(ProfileUpdate {
            total_xp: Some(profile.total_xp.saturating_add(u64::from(event.xp))),
            current_streak: Some(profile.current_streak),
            longest_streak: Some(profile.longest_streak),
            last_active_date: profile.last_active_date,
            ..Default::default()
        });

        if profile.level > level_before {
            tracing::info!(
                "Level up: {} -> {} at {} XP",
                level_before,
                profile.level,
                profile.total_xp
            );
        }

        let unlocked = self.badge_manager().check_unlocks(&profile, now);
        (event, unlocked)
    }

    /// Logged events, newest first.
    pub fn events(&self) -> Vec<XpEvent> {
        self.event_log().events()
    }

    /// The `limit` most recent events.
    pub fn recent_events(&self, limit: usize) -> Vec<XpEvent> {
        self.event_log().recent(limit)
    }

    // ========== Profile ==========

    /// Current profile; defaults are created on first access.
    pub fn get_profile(&self) -> Profile {
        self.profiles().get()
    }

    /// Merge a partial update into the profile.
    pub fn update_profile(&self, update: ProfileUpdate) -> Profile {
        self.profiles().update(update)
    }

    /// Add to one activity counter. Badges are not re-checked.
    pub fn increment_stat(&self, stat: StatKind, by: u32) -> Profile {
        self.profiles().increment_stat(stat, by)
    }

    /// Where the profile sits in the level table.
    pub fn level_progress(&self) -> LevelProgress {
        let profile = self.get_profile();
        LevelProgress::new(profile.total_xp, profile.level)
    }

    /// XP and events logged today.
    pub fn daily_summary(&self) -> DailySummary {
        let today = self.clock.today();
        let events = self.event_log().on_date(today, self.clock.as_ref());
        let profile = self.get_profile();

        DailySummary {
            date: today,
            xp_earned: events.iter().map(|e| u64::from(e.xp)).sum(),
            target: self.settings.daily_xp_target,
            events: events.len(),
            streak: streak::visible_streak(&profile, today),
        }
    }

    // ========== Badges ==========

    /// Badge catalog with unlock state.
    pub fn badges(&self) -> Vec<Badge> {
        self.badge_manager().badges()
    }

    /// Unlock badges the current profile qualifies for.
    pub fn check_unlocks(&self) -> Vec<Badge> {
        let profile = self.get_profile();
        self.badge_manager().check_unlocks(&profile, self.clock.now())
    }

    // ========== Quests ==========

    /// Unexpired quests, regenerating expired ones.
    pub fn active_quests(&self) -> Vec<Quest> {
        self.quest_manager().active()
    }

    /// Set a quest's progress.
    ///
    /// Reaching the target completes the quest, credits its reward and logs
    /// a completion event. Unknown and completed quests are left alone and
    /// yield `None`.
    pub fn update_quest_progress(&self, id: Uuid, value: u32) -> Option<Quest> {
        let progress = self.quest_manager().set_progress(id, value)?;
        if progress.just_completed {
            self.pay_quest(&progress.quest);
        }
        Some(progress.quest)
    }

    fn pay_quest(&self, quest: &Quest) -> Vec<Badge> {
        let profile = self.profiles().add_xp(u64::from(quest.xp_reward));
        tracing::info!(
            "Quest completed: {} (+{} XP, total {})",
            quest.title,
            quest.xp_reward,
            profile.total_xp
        );

        let description = format!("Quest completed: {} (+{} XP)", quest.title, quest.xp_reward);
        self.record_event(XpEventType::TaskComplete, Some(&description)).1
    }

    // ========== Activities ==========

    /// Report a dashboard action.
    ///
    /// Bumps the matching counter, records the matching event, and advances
    /// every active quest tracking that counter by one.
    pub fn log_activity(&self, activity: Activity) -> ActivityOutcome {
        let level_before = self.get_profile().level;

        if let Some(stat) = activity.stat() {
            self.profiles().increment_stat(stat, 1);
        }

        let (event, mut unlocked_badges) = self.record_event(activity.event_type(), None);

        let mut completed_quests = Vec::new();
        if let Some(stat) = activity.stat() {
            let quests = self.quest_manager();
            for quest in quests.tracking(stat) {
                let next = quest.current.saturating_add(1);
                let Some(progress) = quests.set_progress(quest.id, next) else {
                    continue;
                };
                if progress.just_completed {
                    unlocked_badges.extend(self.pay_quest(&progress.quest));
                    completed_quests.push(progress.quest);
                }
            }
        }

        ActivityOutcome {
            event,
            unlocked_badges,
            completed_quests,
            level_before,
            level_after: self.get_profile().level,
        }
    }
}
