use serde::Serialize;
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

/// Counters for one radius run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub files_aggregated: usize,
    pub samples: usize,
    pub no_data: usize,
    pub stations_compared: usize,
    pub stations_empty: usize,
    pub stations_failed: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_file(&self, samples: usize, no_data: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.files_aggregated += 1;
            metrics.samples += samples;
            metrics.no_data += no_data;
        }
    }

    pub fn record_compared(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.stations_compared += 1;
        }
    }

    pub fn record_empty(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.stations_empty += 1;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.stations_failed += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
