//! Activity event log.
//!
//! Newest first, capped by insertion order: appending past the capacity
//! drops the entry that was inserted earliest, whatever its timestamp.

use chrono::NaiveDate;

use super::types::XpEvent;
use crate::clock::Clock;
use crate::storage::{DocumentKind, DocumentStore};

/// Default number of events kept.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Reads and appends to the events document.
pub struct EventLog<'a> {
    docs: &'a DocumentStore,
    capacity: usize,
}

impl<'a> EventLog<'a> {
    /// Create an event log keeping at most `capacity` events.
    pub fn new(docs: &'a DocumentStore, capacity: usize) -> Self {
        Self {
            docs,
            capacity: capacity.max(1),
        }
    }

    /// All stored events, newest first.
    pub fn events(&self) -> Vec<XpEvent> {
        self.docs.load(DocumentKind::Events).unwrap_or_default()
    }

    /// The `limit` most recent events.
    pub fn recent(&self, limit: usize) -> Vec<XpEvent> {
        let mut events = self.events();
        events.truncate(limit);
        events
    }

    /// Prepend an event and persist the capped log.
    pub fn append(&self, event: XpEvent) {
        let mut events = self.events();
        events.insert(0, event);

        if events.len() > self.capacity {
            tracing::debug!("Evicting {} old event(s)", events.len() - self.capacity);
            events.truncate(self.capacity);
        }

        self.docs.save(DocumentKind::Events, &events);
    }

    /// Events whose local calendar date is `date`.
    pub fn on_date(&self, date: NaiveDate, clock: &dyn Clock) -> Vec<XpEvent> {
        self.events()
            .into_iter()
            .filter(|event| clock.local_date(event.timestamp) == date)
            .collect()
    }
}
