use crate::profile::history::History;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time partition a record falls into relative to the target's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Strictly after the most recent calibration event.
    Current,
    /// Strictly between the second most recent and the most recent event.
    Previous,
    Stale,
}

/// Window boundaries derived from the two most recent history events.
///
/// `None` stands for "no such event": without any event every record is
/// current, and without a second event the previous window is unbounded below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowBounds {
    latest: Option<DateTime<Utc>>,
    previous: Option<DateTime<Utc>>,
}

impl WindowBounds {
    pub fn new(latest: Option<DateTime<Utc>>, previous: Option<DateTime<Utc>>) -> Self {
        Self { latest, previous }
    }

    pub fn from_history(history: Option<&History>) -> Self {
        match history {
            Some(history) => Self::new(history.latest(), history.second_latest()),
            None => Self::default(),
        }
    }

    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.latest
    }

    pub fn previous(&self) -> Option<DateTime<Utc>> {
        self.previous
    }

    pub fn classify(&self, timestamp: DateTime<Utc>) -> Window {
        let Some(latest) = self.latest else {
            return Window::Current;
        };
        if timestamp > latest {
            return Window::Current;
        }
        let after_lower = self.previous.map_or(true, |lower| timestamp > lower);
        if timestamp < latest && after_lower {
            Window::Previous
        } else {
            Window::Stale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::history::{EventKind, HistoryEvent};
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn no_history_makes_everything_current() {
        let bounds = WindowBounds::from_history(None);
        assert_eq!(bounds.classify(day(1)), Window::Current);
        let empty = History::new();
        assert_eq!(WindowBounds::from_history(Some(&empty)).classify(day(1)), Window::Current);
    }

    #[test]
    fn two_events_partition_into_three_windows() {
        let history = History::from_events(vec![
            HistoryEvent::new(day(10), EventKind::Calibrated, ""),
            HistoryEvent::new(day(20), EventKind::Compensated, ""),
        ]);
        let bounds = WindowBounds::from_history(Some(&history));

        assert_eq!(bounds.classify(day(21)), Window::Current);
        assert_eq!(bounds.classify(day(20)), Window::Stale);
        assert_eq!(bounds.classify(day(15)), Window::Previous);
        assert_eq!(bounds.classify(day(10)), Window::Stale);
        assert_eq!(bounds.classify(day(5)), Window::Stale);
    }

    #[test]
    fn single_event_leaves_previous_window_unbounded() {
        let history =
            History::from_events(vec![HistoryEvent::new(day(10), EventKind::Calibrated, "")]);
        let bounds = WindowBounds::from_history(Some(&history));

        assert_eq!(bounds.classify(day(1)), Window::Previous);
        assert_eq!(bounds.classify(day(11)), Window::Current);
        assert_eq!(bounds.previous(), None);
    }
}
