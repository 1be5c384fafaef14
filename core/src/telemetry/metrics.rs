use std::sync::Mutex;

use serde::Serialize;

/// Persistence counters reported by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub saves: usize,
    pub loads: usize,
    pub failures: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_save(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.saves += 1;
        }
    }

    pub fn record_load(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.loads += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failures += 1;
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
    fn counters_accumulate_independently() {
        let metrics = MetricsRecorder::new();
        metrics.record_save();
        metrics.record_save();
        metrics.record_failure();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                saves: 2,
                loads: 0,
                failures: 1
            }
        );
    }
}
