//! Rotating daily and weekly quests.
//!
//! The active set holds one quest per template. Expired quests are dropped
//! on read and their template is re-instantiated with a fresh deadline, so
//! a completed daily quest stays completed until the next local midnight.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{Quest, QuestKind, QuestTemplate, StatKind, StoredQuest};
use crate::clock::Clock;
use crate::storage::{DocumentKind, DocumentStore};

impl QuestTemplate {
    /// Every template, in display order.
    pub const ALL: [QuestTemplate; 3] = [
        QuestTemplate::DailyTasks,
        QuestTemplate::DailyCalls,
        QuestTemplate::WeeklyTasks,
    ];

    /// Template whose title is `title`, for records written before templates.
    pub fn from_title(title: &str) -> Option<QuestTemplate> {
        Self::ALL.into_iter().find(|t| t.title() == title)
    }

    pub fn title(&self) -> &'static str {
        match self {
            QuestTemplate::DailyTasks => "Daily Hustler",
            QuestTemplate::DailyCalls => "Call Champion",
            QuestTemplate::WeeklyTasks => "Weekly Warrior",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QuestTemplate::DailyTasks => "Complete 5 tasks today",
            QuestTemplate::DailyCalls => "Log 3 calls today",
            QuestTemplate::WeeklyTasks => "Complete 25 tasks this week",
        }
    }

    pub fn kind(&self) -> QuestKind {
        match self {
            QuestTemplate::DailyTasks | QuestTemplate::DailyCalls => QuestKind::Daily,
            QuestTemplate::WeeklyTasks => QuestKind::Weekly,
        }
    }

    pub fn target(&self) -> u32 {
        match self {
            QuestTemplate::DailyTasks => 5,
            QuestTemplate::DailyCalls => 3,
            QuestTemplate::WeeklyTasks => 25,
        }
    }

    pub fn xp_reward(&self) -> u32 {
        match self {
            QuestTemplate::DailyTasks => 50,
            QuestTemplate::DailyCalls => 40,
            QuestTemplate::WeeklyTasks => 200,
        }
    }

    /// Activity counter whose increments advance this quest.
    pub fn tracks(&self) -> StatKind {
        match self {
            QuestTemplate::DailyTasks | QuestTemplate::WeeklyTasks => StatKind::TasksCompleted,
            QuestTemplate::DailyCalls => StatKind::CallsLogged,
        }
    }

    /// Fresh quest for this template with its deadline computed from `clock`.
    pub fn instantiate(&self, clock: &dyn Clock) -> Quest {
        let days_ahead = match self.kind() {
            QuestKind::Daily => 1,
            QuestKind::Weekly => 7,
        };

        Quest {
            id: Uuid::new_v4(),
            template: *self,
            title: self.title().to_string(),
            description: self.description().to_string(),
            kind: self.kind(),
            target: self.target(),
            current: 0,
            xp_reward: self.xp_reward(),
            completed: false,
            expires_at: clock.local_midnight(days_ahead),
        }
    }
}

/// Generate the full quest set for the current time.
pub fn generate_quests(clock: &dyn Clock) -> Vec<Quest> {
    QuestTemplate::ALL
        .iter()
        .map(|template| template.instantiate(clock))
        .collect()
}

/// Result of a progress update that changed a quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestProgress {
    pub quest: Quest,
    /// The update reached the target
    pub just_completed: bool,
}

/// Reads and writes the quests document.
pub struct QuestManager<'a> {
    docs: &'a DocumentStore,
    clock: &'a dyn Clock,
}

impl<'a> QuestManager<'a> {
    /// Create a quest manager.
    pub fn new(docs: &'a DocumentStore, clock: &'a dyn Clock) -> Self {
        Self { docs, clock }
    }

    /// Unexpired quests, regenerating any template that has none.
    pub fn active(&self) -> Vec<Quest> {
        self.refresh(self.clock.now())
    }

    fn refresh(&self, now: DateTime<Utc>) -> Vec<Quest> {
        let stored: Option<Vec<StoredQuest>> = self.docs.load(DocumentKind::Quests);
        let had_document = stored.is_some();
        let stored = stored.unwrap_or_default();
        let stored_len = stored.len();
        let mut changed = !had_document || stored.iter().any(StoredQuest::is_legacy);

        let mut quests: Vec<Quest> = stored
            .into_iter()
            .filter_map(|q| q.into_quest(QuestTemplate::from_title))
            .filter(|q| !q.is_expired(now))
            .collect();
        changed |= quests.len() != stored_len;

        // A template appears once; later duplicates are dropped
        let before_dedup = quests.len();
        let mut seen = Vec::new();
        quests.retain(|q| {
            let first = !seen.contains(&q.template);
            seen.push(q.template);
            first
        });
        changed |= quests.len() != before_dedup;

        for template in QuestTemplate::ALL {
            if !quests.iter().any(|q| q.template == template) {
                tracing::debug!("Generating quest {}", template.title());
                quests.push(template.instantiate(self.clock));
                changed = true;
            }
        }

        if changed {
            // Keep display order stable across partial regenerations
            quests.sort_by_key(|q| QuestTemplate::ALL.iter().position(|t| *t == q.template));
            self.docs.save(DocumentKind::Quests, &quests);
        }

        quests
    }

    /// Find an active quest by id.
    pub fn get(&self, id: Uuid) -> Option<Quest> {
        self.active().into_iter().find(|q| q.id == id)
    }

    /// Set a quest's progress to `value`, clamped to its target.
    ///
    /// Returns `None` without touching storage when the quest is unknown,
    /// expired, or already completed.
    pub fn set_progress(&self, id: Uuid, value: u32) -> Option<QuestProgress> {
        let mut quests = self.active();
        let quest = quests.iter_mut().find(|q| q.id == id)?;

        if quest.completed {
            return None;
        }

        quest.current = value.min(quest.target);
        let just_completed = quest.current >= quest.target;
        if just_completed {
            quest.completed = true;
        }

        let updated = quest.clone();
        self.docs.save(DocumentKind::Quests, &quests);

        Some(QuestProgress {
            quest: updated,
            just_completed,
        })
    }

    /// Active, uncompleted quests advanced by `stat`.
    pub fn tracking(&self, stat: StatKind) -> Vec<Quest> {
        self.active()
            .into_iter()
            .filter(|q| !q.completed && q.template.tracks() == stat)
            .collect()
    }
}
