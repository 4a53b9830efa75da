//! Core types for progress tracking.
//!
//! Defines the profile, XP events, badges, quests and related enums. Field
//! names serialize in camelCase so stored documents keep the dashboard's
//! existing layout.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Point-scoring action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpEventType {
    /// First contact with a prospect
    FirstTouch,
    /// Task marked done
    TaskComplete,
    /// Call logged against a contact
    CallLogged,
    /// Outreach email sent
    EmailSent,
    /// Deal moved to a later pipeline stage
    DealStageAdvance,
    /// New contact created
    ContactAdded,
    /// Bonus for keeping a streak alive
    StreakBonus,
}

impl XpEventType {
    /// Every event type.
    pub const ALL: [XpEventType; 7] = [
        XpEventType::FirstTouch,
        XpEventType::TaskComplete,
        XpEventType::CallLogged,
        XpEventType::EmailSent,
        XpEventType::DealStageAdvance,
        XpEventType::ContactAdded,
        XpEventType::StreakBonus,
    ];

    /// Fixed XP awarded for this event type.
    pub fn xp(&self) -> u32 {
        match self {
            XpEventType::FirstTouch => 5,
            XpEventType::TaskComplete => 10,
            XpEventType::CallLogged => 15,
            XpEventType::EmailSent => 8,
            XpEventType::DealStageAdvance => 25,
            XpEventType::ContactAdded => 12,
            XpEventType::StreakBonus => 20,
        }
    }

    /// Description used when the caller gives none.
    pub fn default_description(&self) -> &'static str {
        match self {
            XpEventType::FirstTouch => "First contact with prospect",
            XpEventType::TaskComplete => "Completed a task",
            XpEventType::CallLogged => "Logged a call",
            XpEventType::EmailSent => "Sent an email",
            XpEventType::DealStageAdvance => "Advanced deal stage",
            XpEventType::ContactAdded => "Added new contact",
            XpEventType::StreakBonus => "Daily streak bonus",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            XpEventType::FirstTouch => "first_touch",
            XpEventType::TaskComplete => "task_complete",
            XpEventType::CallLogged => "call_logged",
            XpEventType::EmailSent => "email_sent",
            XpEventType::DealStageAdvance => "deal_stage_advance",
            XpEventType::ContactAdded => "contact_added",
            XpEventType::StreakBonus => "streak_bonus",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for XpEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry in the activity log. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpEvent {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: XpEventType,
    pub xp: u32,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl XpEvent {
    /// Create an event with a fresh id and the type's fixed XP.
    pub fn new(kind: XpEventType, description: Option<&str>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            xp: kind.xp(),
            description: description
                .unwrap_or_else(|| kind.default_description())
                .to_string(),
            timestamp,
        }
    }
}

/// Per-category activity counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    ContactsAdded,
    TasksCompleted,
    CallsLogged,
    EmailsSent,
    DealsAdvanced,
}

impl StatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::ContactsAdded => "contacts_added",
            StatKind::TasksCompleted => "tasks_completed",
            StatKind::CallsLogged => "calls_logged",
            StatKind::EmailsSent => "emails_sent",
            StatKind::DealsAdvanced => "deals_advanced",
        }
    }
}

/// Activity counters kept on the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileStats {
    pub contacts_added: u32,
    pub tasks_completed: u32,
    pub calls_logged: u32,
    pub emails_sent: u32,
    pub deals_advanced: u32,
}

impl ProfileStats {
    /// Current value of a counter.
    pub fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::ContactsAdded => self.contacts_added,
            StatKind::TasksCompleted => self.tasks_completed,
            StatKind::CallsLogged => self.calls_logged,
            StatKind::EmailsSent => self.emails_sent,
            StatKind::DealsAdvanced => self.deals_advanced,
        }
    }

    /// Add to a counter, saturating at `u32::MAX`.
    pub fn increment(&mut self, stat: StatKind, by: u32) {
        let counter = match stat {
            StatKind::ContactsAdded => &mut self.contacts_added,
            StatKind::TasksCompleted => &mut self.tasks_completed,
            StatKind::CallsLogged => &mut self.calls_logged,
            StatKind::EmailsSent => &mut self.emails_sent,
            StatKind::DealsAdvanced => &mut self.deals_advanced,
        };
        *counter = counter.saturating_add(by);
    }
}

/// Aggregate progress of the single local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
    pub level: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    /// Local calendar date of the last recorded activity
    #[serde(default)]
    pub last_active_date: Option<NaiveDate>,
    #[serde(default)]
    pub stats: ProfileStats,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            total_xp: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
            stats: ProfileStats::default(),
        }
    }
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub total_xp: Option<u64>,
    pub level: Option<u32>,
    pub current_streak: Option<u32>,
    pub longest_streak: Option<u32>,
    pub last_active_date: Option<NaiveDate>,
    pub stats: Option<ProfileStats>,
}

impl ProfileUpdate {
    /// Update that sets the total XP.
    pub fn total_xp(total_xp: u64) -> Self {
        Self {
            total_xp: Some(total_xp),
            ..Default::default()
        }
    }
}

/// Badge category. Selects the profile counter a badge is measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Contacts,
    Tasks,
    Calls,
    Emails,
    Deals,
    /// Measured on the longest streak
    Streak,
}

impl BadgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeCategory::Contacts => "contacts",
            BadgeCategory::Tasks => "tasks",
            BadgeCategory::Calls => "calls",
            BadgeCategory::Emails => "emails",
            BadgeCategory::Deals => "deals",
            BadgeCategory::Streak => "streak",
        }
    }

    /// Counter this category is compared against.
    pub fn counter(&self, profile: &Profile) -> u32 {
        match self {
            BadgeCategory::Contacts => profile.stats.contacts_added,
            BadgeCategory::Tasks => profile.stats.tasks_completed,
            BadgeCategory::Calls => profile.stats.calls_logged,
            BadgeCategory::Emails => profile.stats.emails_sent,
            BadgeCategory::Deals => profile.stats.deals_advanced,
            BadgeCategory::Streak => profile.longest_streak,
        }
    }
}

/// Badge definition with its unlock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirement: u32,
    pub category: BadgeCategory,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Badge {
    fn locked(
        id: &str,
        name: &str,
        description: &str,
        icon: &str,
        requirement: u32,
        category: BadgeCategory,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            requirement,
            category,
            unlocked: false,
            unlocked_at: None,
        }
    }

    /// Progress towards the requirement (0..100).
    pub fn percentage(&self, profile: &Profile) -> f32 {
        if self.unlocked {
            return 100.0;
        }
        let current = self.category.counter(profile) as f32;
        ((current / self.requirement.max(1) as f32) * 100.0).min(100.0)
    }
}

/// Default badge definitions.
pub fn default_badges() -> Vec<Badge> {
    use BadgeCategory::*;

    vec![
        Badge::locked(
            "first_contact",
            "First Contact",
            "Add your first contact",
            "👤",
            1,
            Contacts,
        ),
        Badge::locked(
            "contact_collector",
            "Contact Collector",
            "Add 25 contacts",
            "📇",
            25,
            Contacts,
        ),
        Badge::locked(
            "networking_pro",
            "Networking Pro",
            "Add 100 contacts",
            "🌐",
            100,
            Contacts,
        ),
        Badge::locked("task_starter", "Task Starter", "Complete 5 tasks", "✅", 5, Tasks),
        Badge::locked("task_master", "Task Master", "Complete 50 tasks", "🎯", 50, Tasks),
        Badge::locked(
            "productivity_king",
            "Productivity King",
            "Complete 200 tasks",
            "👑",
            200,
            Tasks,
        ),
        Badge::locked("first_call", "First Call", "Log your first call", "📞", 1, Calls),
        Badge::locked("call_champion", "Call Champion", "Log 50 calls", "📱", 50, Calls),
        Badge::locked("email_enthusiast", "Email Enthusiast", "Send 25 emails", "📧", 25, Emails),
        Badge::locked("inbox_hero", "Inbox Hero", "Send 100 emails", "💌", 100, Emails),
        Badge::locked("deal_maker", "Deal Maker", "Advance 10 deals", "💼", 10, Deals),
        Badge::locked("sales_legend", "Sales Legend", "Advance 50 deals", "🏆", 50, Deals),
        Badge::locked("week_warrior", "Week Warrior", "7-day streak", "🔥", 7, Streak),
        Badge::locked("month_master", "Month Master", "30-day streak", "⚡", 30, Streak),
    ]
}

/// Quest cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    /// Expires at the next local midnight
    Daily,
    /// Expires at local midnight seven days out
    Weekly,
}

impl QuestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestKind::Daily => "daily",
            QuestKind::Weekly => "weekly",
        }
    }
}

/// Stable identifier of a quest's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestTemplate {
    /// Complete tasks today
    DailyTasks,
    /// Log calls today
    DailyCalls,
    /// Complete tasks this week
    WeeklyTasks,
}

/// Time-boxed objective with bounded progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: Uuid,
    pub template: QuestTemplate,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: QuestKind,
    pub target: u32,
    pub current: u32,
    pub xp_reward: u32,
    pub completed: bool,
    pub expires_at: DateTime<Utc>,
}

impl Quest {
    /// Whether the quest is past its deadline at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Progress towards the target (0..100).
    pub fn percentage(&self) -> f32 {
        if self.target == 0 {
            return 100.0;
        }
        ((self.current as f32 / self.target as f32) * 100.0).min(100.0)
    }
}

/// Quest as read from storage. Dashboard documents predate `template`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredQuest {
    id: Uuid,
    #[serde(default)]
    template: Option<QuestTemplate>,
    title: String,
    description: String,
    #[serde(rename = "type")]
    kind: QuestKind,
    target: u32,
    current: u32,
    xp_reward: u32,
    completed: bool,
    expires_at: DateTime<Utc>,
}

impl StoredQuest {
    /// Whether the stored record lacked a template.
    pub(crate) fn is_legacy(&self) -> bool {
        self.template.is_none()
    }

    /// Resolve the template, falling back to `by_title` for legacy records.
    pub(crate) fn into_quest(
        self,
        by_title: impl FnOnce(&str) -> Option<QuestTemplate>,
    ) -> Option<Quest> {
        let template = match self.template {
            Some(template) => template,
            None => by_title(&self.title)?,
        };

        Some(Quest {
            id: self.id,
            template,
            title: self.title,
            description: self.description,
            kind: self.kind,
            target: self.target,
            current: self.current,
            xp_reward: self.xp_reward,
            completed: self.completed,
            expires_at: self.expires_at,
        })
    }
}

/// User action reported by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    ContactAdded,
    TaskCompleted,
    CallLogged,
    EmailSent,
    DealAdvanced,
    FirstTouch,
}

impl Activity {
    /// Every activity.
    pub const ALL: [Activity; 6] = [
        Activity::ContactAdded,
        Activity::TaskCompleted,
        Activity::CallLogged,
        Activity::EmailSent,
        Activity::DealAdvanced,
        Activity::FirstTouch,
    ];

    /// Event recorded for this activity.
    pub fn event_type(&self) -> XpEventType {
        match self {
            Activity::ContactAdded => XpEventType::ContactAdded,
            Activity::TaskCompleted => XpEventType::TaskComplete,
            Activity::CallLogged => XpEventType::CallLogged,
            Activity::EmailSent => XpEventType::EmailSent,
            Activity::DealAdvanced => XpEventType::DealStageAdvance,
            Activity::FirstTouch => XpEventType::FirstTouch,
        }
    }

    /// Counter bumped by this activity, if any.
    pub fn stat(&self) -> Option<StatKind> {
        match self {
            Activity::ContactAdded => Some(StatKind::ContactsAdded),
            Activity::TaskCompleted => Some(StatKind::TasksCompleted),
            Activity::CallLogged => Some(StatKind::CallsLogged),
            Activity::EmailSent => Some(StatKind::EmailsSent),
            Activity::DealAdvanced => Some(StatKind::DealsAdvanced),
            Activity::FirstTouch => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::ContactAdded => "contact_added",
            Activity::TaskCompleted => "task_completed",
            Activity::CallLogged => "call_logged",
            Activity::EmailSent => "email_sent",
            Activity::DealAdvanced => "deal_advanced",
            Activity::FirstTouch => "first_touch",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }
}
