//! Unit tests for the progress engine

use chrono::{Duration, TimeZone, Utc};
use onx_progress::gamification::{
    Activity, EngineSettings, GamificationEngine, ProfileUpdate, QuestTemplate, XpEventType,
};
use onx_progress::storage::{DocumentKind, KeyValueStore, MemoryStore, StorageError};
use onx_progress::FixedClock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

fn setup() -> (Arc<FixedClock>, GamificationEngine) {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap()));
    let engine = GamificationEngine::in_memory(clock.clone());
    (clock, engine)
}

/// Test XP accumulates per event type
#[test]
fn test_total_xp_is_sum_of_event_xp() {
    let (_clock, engine) = setup();

    for _ in 0..3 {
        engine.record(XpEventType::TaskComplete, None);
    }
    assert_eq!(engine.get_profile().total_xp, 30);

    let mut expected = 30u64;
    for kind in XpEventType::ALL {
        engine.record(kind, None);
        expected += u64::from(kind.xp());
    }
    assert_eq!(engine.get_profile().total_xp, expected);
}

#[test]
fn test_level_follows_xp() {
    let (_clock, engine) = setup();

    let profile = engine.update_profile(ProfileUpdate::total_xp(250));
    assert_eq!(profile.level, 3);

    let profile = engine.update_profile(ProfileUpdate::total_xp(999));
    assert_eq!(profile.level, 4);

    // 4 x 25 XP crosses 1000
    for _ in 0..4 {
        engine.record(XpEventType::DealStageAdvance, None);
    }
    let profile = engine.get_profile();
    assert_eq!(profile.total_xp, 1099);
    assert_eq!(profile.level, 5);
}

#[test]
fn test_level_progress_at_cap() {
    let (_clock, engine) = setup();
    engine.update_profile(ProfileUpdate::total_xp(12_345));

    let progress = engine.level_progress();
    assert_eq!(progress.level, 11);
    assert_eq!(progress.xp_to_next, 0);
    assert_eq!(progress.percent, 100.0);
    assert!(progress.is_max_level());
}

// ========== Streaks ==========

#[test]
fn test_streak_extends_on_next_day() {
    let (clock, engine) = setup();
    engine.record(XpEventType::EmailSent, None);
    engine.record(XpEventType::EmailSent, None);
    assert_eq!(engine.get_profile().current_streak, 1);

    clock.advance(Duration::days(1));
    engine.record(XpEventType::EmailSent, None);
    let profile = engine.get_profile();
    assert_eq!(profile.current_streak, 2);
    assert_eq!(profile.longest_streak, 2);
}

#[test]
fn test_streak_resets_after_gap() {
    let (clock, engine) = setup();
    for _ in 0..3 {
        engine.record(XpEventType::CallLogged, None);
        clock.advance(Duration::days(1));
    }
    assert_eq!(engine.get_profile().current_streak, 3);

    clock.advance(Duration::days(1));
    engine.record(XpEventType::CallLogged, None);
    let profile = engine.get_profile();
    assert_eq!(profile.current_streak, 1);
    assert_eq!(profile.longest_streak, 3);
    assert!(profile.longest_streak >= profile.current_streak);
}

#[test]
fn test_streak_ignores_time_of_day() {
    let (clock, engine) = setup();
    clock.set(Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 0).unwrap());
    engine.record(XpEventType::TaskComplete, None);

    clock.set(Utc.with_ymd_and_hms(2026, 3, 10, 0, 1, 0).unwrap());
    engine.record(XpEventType::TaskComplete, None);
    assert_eq!(engine.get_profile().current_streak, 2);
}

#[test]
fn test_week_streak_unlocks_badge() {
    let (clock, engine) = setup();
    for _ in 0..7 {
        engine.record(XpEventType::FirstTouch, None);
        clock.advance(Duration::days(1));
    }

    let week = engine
        .badges()
        .into_iter()
        .find(|b| b.id == "week_warrior")
        .unwrap();
    assert!(week.unlocked);
}

// ========== Badges ==========

#[test]
fn test_badges_unlock_once() {
    let (clock, engine) = setup();

    let outcome = engine.log_activity(Activity::ContactAdded);
    let ids: Vec<&str> = outcome.unlocked_badges.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["first_contact"]);

    let unlocked_at = engine
        .badges()
        .into_iter()
        .find(|b| b.id == "first_contact")
        .and_then(|b| b.unlocked_at);

    clock.advance(Duration::hours(2));
    assert!(engine.check_unlocks().is_empty());
    let outcome = engine.log_activity(Activity::ContactAdded);
    assert!(outcome.unlocked_badges.is_empty());

    let badge = engine
        .badges()
        .into_iter()
        .find(|b| b.id == "first_contact")
        .unwrap();
    assert!(badge.unlocked);
    assert_eq!(badge.unlocked_at, unlocked_at);
}

#[test]
fn test_badges_survive_counter_reset() {
    let (_clock, engine) = setup();
    engine.log_activity(Activity::CallLogged);

    let mut profile = engine.get_profile();
    profile.stats.calls_logged = 0;
    engine.update_profile(ProfileUpdate {
        stats: Some(profile.stats),
        ..Default::default()
    });

    assert!(engine.check_unlocks().is_empty());
    assert!(engine.badges().iter().any(|b| b.id == "first_call" && b.unlocked));
}

#[test]
fn test_increment_stat_then_check_unlocks() {
    let (_clock, engine) = setup();
    engine.increment_stat(onx_progress::gamification::StatKind::DealsAdvanced, 10);

    let unlocked = engine.check_unlocks();
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0].id, "deal_maker");
}

// ========== Quests ==========

#[test]
fn test_quest_reward_paid_once() {
    let (_clock, engine) = setup();
    let quest = engine
        .active_quests()
        .into_iter()
        .find(|q| q.template == QuestTemplate::DailyTasks)
        .unwrap();

    let before = engine.get_profile().total_xp;
    let completed = engine.update_quest_progress(quest.id, quest.target).unwrap();
    assert!(completed.completed);

    // Reward plus the completion event's own task XP
    let after = engine.get_profile().total_xp;
    let expected = u64::from(quest.xp_reward) + u64::from(XpEventType::TaskComplete.xp());
    assert_eq!(after - before, expected);

    assert!(engine.update_quest_progress(quest.id, quest.target).is_none());
    assert_eq!(engine.get_profile().total_xp, after);

    let latest = &engine.events()[0];
    assert_eq!(latest.description, "Quest completed: Daily Hustler (+50 XP)");
}

#[test]
fn test_quest_progress_clamped() {
    let (_clock, engine) = setup();
    let quest = engine.active_quests()[2].clone();
    assert_eq!(quest.template, QuestTemplate::WeeklyTasks);

    let updated = engine.update_quest_progress(quest.id, 10).unwrap();
    assert_eq!(updated.current, 10);
    assert!(!updated.completed);

    let updated = engine.update_quest_progress(quest.id, 500).unwrap();
    assert_eq!(updated.current, 25);
    assert!(updated.completed);
}

#[test]
fn test_unknown_quest_is_noop() {
    let (_clock, engine) = setup();
    engine.active_quests();
    let before = engine.get_profile();
    assert!(engine.update_quest_progress(Uuid::new_v4(), 3).is_none());
    assert_eq!(engine.get_profile(), before);
}

#[test]
fn test_activities_advance_quests_by_template() {
    let (_clock, engine) = setup();

    let mut completed = Vec::new();
    for _ in 0..5 {
        completed.extend(engine.log_activity(Activity::TaskCompleted).completed_quests);
    }
    engine.log_activity(Activity::EmailSent);

    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].template, QuestTemplate::DailyTasks);

    let quests = engine.active_quests();
    let progress: Vec<(QuestTemplate, u32, bool)> =
        quests.iter().map(|q| (q.template, q.current, q.completed)).collect();
    assert_eq!(
        progress,
        vec![
            (QuestTemplate::DailyTasks, 5, true),
            (QuestTemplate::DailyCalls, 0, false),
            (QuestTemplate::WeeklyTasks, 5, false),
        ]
    );

    // 5 tasks + 1 email + quest reward + completion event
    assert_eq!(engine.get_profile().total_xp, 50 + 8 + 50 + 10);
    assert_eq!(engine.get_profile().stats.tasks_completed, 5);
}

#[test]
fn test_completed_daily_quest_rotates_at_midnight() {
    let (clock, engine) = setup();
    for _ in 0..3 {
        engine.log_activity(Activity::CallLogged);
    }
    let calls = engine.active_quests()[1].clone();
    assert!(calls.completed);

    // Still completed later the same day
    clock.advance(Duration::hours(10));
    assert!(engine.active_quests()[1].completed);

    clock.advance(Duration::hours(4));
    let fresh = engine.active_quests()[1].clone();
    assert_ne!(fresh.id, calls.id);
    assert_eq!(fresh.current, 0);
    assert!(!fresh.completed);
}

#[test]
fn test_expired_quest_progress_is_noop() {
    let (clock, engine) = setup();
    let quest = engine.active_quests()[0].clone();

    clock.advance(Duration::days(1));
    assert!(engine.update_quest_progress(quest.id, quest.target).is_none());
}

// ========== Event log ==========

#[test]
fn test_event_log_capped_at_100() {
    let (_clock, engine) = setup();
    for i in 0..101 {
        engine.record(XpEventType::EmailSent, Some(&format!("email {}", i)));
    }

    let events = engine.events();
    assert_eq!(events.len(), 100);
    assert_eq!(events[0].description, "email 100");
    assert_eq!(events[99].description, "email 1");
    assert_eq!(engine.get_profile().total_xp, 101 * 8);
}

#[test]
fn test_custom_capacity() {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let settings = EngineSettings {
        event_capacity: 5,
        ..Default::default()
    };
    let engine = GamificationEngine::new(Box::new(MemoryStore::new()), clock, settings);
    for _ in 0..8 {
        engine.record(XpEventType::FirstTouch, None);
    }
    assert_eq!(engine.events().len(), 5);
}

// ========== Notifications ==========

#[test]
fn test_record_notifies_subscribers() {
    let (_clock, engine) = setup();
    engine.badges();
    let rx = engine.subscribe();

    engine.record(XpEventType::StreakBonus, None);

    let documents: Vec<DocumentKind> = rx.try_iter().map(|c| c.document).collect();
    assert!(documents.contains(&DocumentKind::Events));
    assert!(documents.contains(&DocumentKind::Profile));
}

// ========== Storage faults ==========

/// Memory store whose reads and writes can be switched to failing.
struct FaultyStore {
    inner: MemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FaultyStore {
    fn new() -> (Self, Arc<AtomicBool>, Arc<AtomicBool>) {
        let fail_reads = Arc::new(AtomicBool::new(false));
        let fail_writes = Arc::new(AtomicBool::new(false));
        let store = Self {
            inner: MemoryStore::new(),
            fail_reads: fail_reads.clone(),
            fail_writes: fail_writes.clone(),
        };
        (store, fail_reads, fail_writes)
    }

    fn check(flag: &AtomicBool) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::QueryFailed("disk unavailable".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for FaultyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::check(&self.fail_reads)?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::check(&self.fail_writes)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::check(&self.fail_writes)?;
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Self::check(&self.fail_reads)?;
        self.inner.keys()
    }
}

fn faulty_engine() -> (GamificationEngine, Arc<AtomicBool>, Arc<AtomicBool>) {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap()));
    let (store, fail_reads, fail_writes) = FaultyStore::new();
    let engine = GamificationEngine::new(Box::new(store), clock, EngineSettings::default());
    (engine, fail_reads, fail_writes)
}

#[test]
fn test_failed_writes_still_return_results() {
    let (engine, _fail_reads, fail_writes) = faulty_engine();
    engine.record(XpEventType::EmailSent, None);
    let quests = engine.active_quests();
    fail_writes.store(true, Ordering::SeqCst);

    let event = engine.record(XpEventType::CallLogged, None);
    assert_eq!(event.xp, 15);
    assert_eq!(event.description, "Logged a call");

    let calls = engine.update_quest_progress(quests[1].id, 1).unwrap();
    assert_eq!(calls.current, 1);
    assert!(!calls.completed);

    let tasks = engine.update_quest_progress(quests[0].id, 99).unwrap();
    assert_eq!(tasks.current, 5);
    assert!(tasks.completed);

    // Nothing was persisted after the writes started failing
    assert_eq!(engine.get_profile().total_xp, 8);
    assert_eq!(engine.events().len(), 1);
    assert_eq!(engine.active_quests(), quests);
}

#[test]
fn test_unreadable_backend_falls_back_to_defaults() {
    let (engine, fail_reads, fail_writes) = faulty_engine();
    fail_reads.store(true, Ordering::SeqCst);
    fail_writes.store(true, Ordering::SeqCst);

    let event = engine.record(XpEventType::DealStageAdvance, Some("Moved to proposal"));
    assert_eq!(event.xp, 25);
    assert_eq!(event.description, "Moved to proposal");

    let outcome = engine.log_activity(Activity::CallLogged);
    assert_eq!(outcome.event.kind, XpEventType::CallLogged);
    assert_eq!(outcome.level_after, 1);

    assert_eq!(engine.get_profile().total_xp, 0);
    assert!(engine.events().is_empty());
    assert_eq!(engine.badges().len(), 14);

    let quests = engine.active_quests();
    assert_eq!(quests.len(), 3);
    assert!(engine.update_quest_progress(Uuid::new_v4(), 1).is_none());
}
