//! Per-call gateway metrics

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const MAX_RECORDS: usize = 1000;

/// One outbound attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    pub endpoint: String,
    pub timestamp: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub success: bool,
    /// Missing when no HTTP response arrived
    pub status: Option<u16>,
}

impl CallRecord {
    pub fn new(endpoint: &str, elapsed: Duration, status: Option<u16>, success: bool) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timestamp: Utc::now(),
            elapsed_ms: elapsed.as_millis() as u64,
            success,
            status,
        }
    }
}

/// Point-in-time view of [`GatewayMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub success_rate: f64,
    pub average_latency_ms: f64,
    /// Last `X-Rate-Limit-Remaining` seen from Canvas
    pub rate_limit_remaining: Option<f64>,
}

#[derive(Debug, Default)]
struct MetricsState {
    records: VecDeque<CallRecord>,
    total_calls: u64,
    successful_calls: u64,
    total_elapsed_ms: u64,
    rate_limit_remaining: Option<f64>,
}

/// Running call statistics, shared by every clone of a gateway
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    state: Mutex<MetricsState>,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, record: CallRecord) {
        let mut state = self.lock();
        state.total_calls += 1;
        if record.success {
            state.successful_calls += 1;
        }
        state.total_elapsed_ms += record.elapsed_ms;
        if state.records.len() == MAX_RECORDS {
            state.records.pop_front();
        }
        state.records.push_back(record);
    }

    pub fn note_rate_limit_remaining(&self, remaining: f64) {
        self.lock().rate_limit_remaining = Some(remaining);
    }

    pub fn total_calls(&self) -> u64 {
        self.lock().total_calls
    }

    /// Fraction of successful calls; 1.0 before any call
    pub fn success_rate(&self) -> f64 {
        let state = self.lock();
        if state.total_calls == 0 {
            return 1.0;
        }
        state.successful_calls as f64 / state.total_calls as f64
    }

    pub fn average_latency(&self) -> Duration {
        let state = self.lock();
        if state.total_calls == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(state.total_elapsed_ms / state.total_calls)
    }

    /// Most recent records, newest last
    pub fn recent(&self, limit: usize) -> Vec<CallRecord> {
        let state = self.lock();
        let skip = state.records.len().saturating_sub(limit);
        state.records.iter().skip(skip).cloned().collect()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.lock();
        let (success_rate, average_latency_ms) = if state.total_calls == 0 {
            (1.0, 0.0)
        } else {
            (
                state.successful_calls as f64 / state.total_calls as f64,
                state.total_elapsed_ms as f64 / state.total_calls as f64,
            )
        };

        MetricsSnapshot {
            total_calls: state.total_calls,
            successful_calls: state.successful_calls,
            failed_calls: state.total_calls - state.successful_calls,
            success_rate,
            average_latency_ms,
            rate_limit_remaining: state.rate_limit_remaining,
        }
    }

    pub fn reset(&self) {
        *self.lock() = MetricsState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_and_latency() {
        let metrics = GatewayMetrics::new();
        metrics.record(CallRecord::new("/a", Duration::from_millis(10), Some(200), true));
        metrics.record(CallRecord::new("/b", Duration::from_millis(30), Some(500), false));
        metrics.record(CallRecord::new("/c", Duration::from_millis(20), None, false));
        metrics.record(CallRecord::new("/d", Duration::from_millis(40), Some(200), true));

        assert_eq!(metrics.total_calls(), 4);
        assert!((metrics.success_rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(metrics.average_latency(), Duration::from_millis(25));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.failed_calls, 2);
        assert_eq!(snapshot.average_latency_ms, 25.0);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = GatewayMetrics::new();
        assert_eq!(metrics.success_rate(), 1.0);
        assert_eq!(metrics.average_latency(), Duration::ZERO);
        assert!(metrics.recent(5).is_empty());
    }

    #[test]
    fn test_ring_is_bounded() {
        let metrics = GatewayMetrics::new();
        for i in 0..(MAX_RECORDS + 5) {
            metrics.record(CallRecord::new(&format!("/{i}"), Duration::ZERO, Some(200), true));
        }

        assert_eq!(metrics.total_calls(), (MAX_RECORDS + 5) as u64);
        let recent = metrics.recent(usize::MAX);
        assert_eq!(recent.len(), MAX_RECORDS);
        assert_eq!(recent.last().unwrap().endpoint, format!("/{}", MAX_RECORDS + 4));
    }

    #[test]
    fn test_reset_clears_everything() {
        let metrics = GatewayMetrics::new();
        metrics.record(CallRecord::new("/a", Duration::from_millis(5), Some(200), true));
        metrics.note_rate_limit_remaining(512.5);

        metrics.reset();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_calls, 0);
        assert_eq!(snapshot.rate_limit_remaining, None);
    }
}
