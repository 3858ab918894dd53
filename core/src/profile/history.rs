use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Baseline values measured or edited outside this engine.
    Calibrated,
    Compensated,
    Reverted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl HistoryEvent {
    pub fn new(timestamp: DateTime<Utc>, kind: EventKind, note: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind,
            note: note.into(),
        }
    }
}

/// Calibration events of one target, kept in timestamp order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<HistoryEvent>", into = "Vec<HistoryEvent>")]
pub struct History {
    events: Vec<HistoryEvent>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(mut events: Vec<HistoryEvent>) -> Self {
        events.sort_by_key(|event| event.timestamp);
        Self { events }
    }

    /// Inserts an event after every event with an equal or older timestamp.
    pub fn append(&mut self, event: HistoryEvent) {
        let position = self
            .events
            .partition_point(|existing| existing.timestamp <= event.timestamp);
        self.events.insert(position, event);
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.events.last().map(|event| event.timestamp)
    }

    pub fn second_latest(&self) -> Option<DateTime<Utc>> {
        self.events
            .len()
            .checked_sub(2)
            .map(|index| self.events[index].timestamp)
    }
}

impl From<Vec<HistoryEvent>> for History {
    fn from(events: Vec<HistoryEvent>) -> Self {
        Self::from_events(events)
    }
}

impl From<History> for Vec<HistoryEvent> {
    fn from(history: History) -> Self {
        history.events
    }
}
