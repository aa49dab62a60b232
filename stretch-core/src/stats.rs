//! Call statistics for the verification endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters owned by one checker instance.
///
/// Counters are atomic so a checker shared across tasks never loses an
/// increment. A fresh instance starts from zero.
#[derive(Debug, Default)]
pub struct CallStatistics {
    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    rate_limited: AtomicU64,
}

impl CallStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request was initiated (once per request, not per attempt).
    pub fn record_request(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// A request finished with a verdict.
    pub fn record_success(&self) {
        self.successful.fetch_add(1, Ordering::Relaxed);
    }

    /// A request exhausted its attempts.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// An attempt was answered with 429.
    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn successful(&self) -> u64 {
        self.successful.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total(),
            successful: self.successful(),
            failed: self.failed(),
            rate_limited: self.rate_limited(),
            taken_at: Utc::now(),
        }
    }
}

/// Serializable copy of [`CallStatistics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub rate_limited: u64,
    pub taken_at: DateTime<Utc>,
}

impl StatsSnapshot {
    /// Fraction of requests that produced a verdict (0.0 when idle).
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64
        }
    }

    /// Requests that neither succeeded nor failed (cancelled mid-flight).
    pub fn unfinished(&self) -> u64 {
        self.total.saturating_sub(self.successful + self.failed)
    }
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== verification API statistics ===")?;
        writeln!(f, "total requests:   {}", self.total)?;
        writeln!(f, "successful:       {}", self.successful)?;
        writeln!(f, "failed:           {}", self.failed)?;
        write!(f, "rate limited:     {}", self.rate_limited)?;
        if self.total > 0 {
            write!(f, "\nsuccess rate:     {:.1}%", self.success_rate() * 100.0)?;
        }
        Ok(())
    }
}
