//! Request counters for one run (lock-free atomics, shared by concurrent fetches).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct RunStats {
    pub requests: AtomicU64,
    pub request_errors: AtomicU64,
    pub auth_failures: AtomicU64,
    pub records: AtomicU64,

    // --- Latency (μs) ---
    pub duration_us_sum: AtomicU64,
    pub duration_us_max: AtomicU64,
}

/// Point-in-time copy of [`RunStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub requests: u64,
    pub request_errors: u64,
    pub auth_failures: u64,
    pub records: u64,
    pub avg_latency: Duration,
    pub max_latency: Duration,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.duration_us_sum.fetch_add(us, Ordering::Relaxed);
        self.duration_us_max.fetch_max(us, Ordering::Relaxed);
    }

    pub fn record_error(&self, auth: bool) {
        self.request_errors.fetch_add(1, Ordering::Relaxed);
        if auth {
            self.auth_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_records(&self, count: usize) {
        self.records.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let requests = self.requests.load(Ordering::Relaxed);
        let sum = self.duration_us_sum.load(Ordering::Relaxed);
        let avg = if requests == 0 { 0 } else { sum / requests };
        StatsSnapshot {
            requests,
            request_errors: self.request_errors.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            avg_latency: Duration::from_micros(avg),
            max_latency: Duration::from_micros(self.duration_us_max.load(Ordering::Relaxed)),
        }
    }
}
