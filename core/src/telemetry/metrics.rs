use crate::batch::window::Window;
use serde::Serialize;
use std::sync::Mutex;

/// Counts batches and window classifications across a session.
///
/// Batches share no state with each other; this recorder is the one piece a
/// caller may share between them.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub batches: usize,
    pub current: usize,
    pub previous: usize,
    pub stale: usize,
    pub unmatched: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_batch(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.batches += 1;
        }
    }

    pub fn record_window(&self, window: Window) {
        if let Ok(mut metrics) = self.inner.lock() {
            match window {
                Window::Current => metrics.current += 1,
                Window::Previous => metrics.previous += 1,
                Window::Stale => metrics.stale += 1,
            }
        }
    }

    /// A record whose profile serial matched no target.
    pub fn record_unmatched(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.unmatched += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_windows() {
        let recorder = MetricsRecorder::new();
        recorder.record_batch();
        recorder.record_window(Window::Current);
        recorder.record_window(Window::Current);
        recorder.record_window(Window::Stale);
        recorder.record_unmatched();

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.batches, 1);
        assert_eq!(snapshot.current, 2);
        assert_eq!(snapshot.previous, 0);
        assert_eq!(snapshot.stale, 1);
        assert_eq!(snapshot.unmatched, 1);
    }
}
