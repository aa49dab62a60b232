//! Bounded retry with pacing and rate-limit backoff.
//!
//! Every logical request walks an explicit state machine:
//!
//! ```text
//! Pending -> Waiting -> Attempting -> Succeeded
//!               ^            |-----> RateLimitedRetry --(backoff)--> Waiting | Exhausted
//!               |            '-----> TransportRetry  ---------------> Waiting | Exhausted
//! ```
//!
//! - `Waiting` sleeps `base_delay + jitter` before *every* attempt, so calls
//!   are paced against the endpoint's rate limit even when nothing fails.
//! - A 429 sleeps a further `(attempt + 1) * backoff_step` before the next
//!   attempt and consumes one attempt.
//! - A transport failure goes straight back to `Waiting` while attempts
//!   remain.
//!
//! Sleeping and jitter are injected through [`Sleeper`] and [`Jitter`] so
//! tests can drive rate-limit sequences without wall-clock waits. Both
//! suspension points honor a [`CancelToken`].

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{AttemptError, Error, Result};
use crate::stats::CallStatistics;
use crate::types::{Verdict, VerificationRequest, VerificationResult};
use crate::verify::Verifier;

/// Default attempt budget.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default fixed part of the pacing delay.
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(2);

/// Backoff unit applied per attempt after a 429.
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_secs(5);

/// Attempt budget and delay settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum attempts per request (at least 1)
    pub max_retries: u32,
    /// Fixed delay before each attempt
    pub base_delay: Duration,
    /// Backoff unit after a rate-limited attempt
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RATE_LIMIT_DELAY,
            backoff_step: DEFAULT_BACKOFF_STEP,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay,
            backoff_step: DEFAULT_BACKOFF_STEP,
        }
    }

    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Backoff after a 429 on `attempt` (0-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_step * (attempt + 1)
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Asynchronous sleep, swappable in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Random component of the pacing delay.
pub trait Jitter: Send + Sync {
    fn sample(&self) -> Duration;
}

/// Uniform jitter in `[low, high]` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformJitter {
    low: f64,
    high: f64,
}

impl UniformJitter {
    pub fn new(low: f64, high: f64) -> Self {
        let low = low.max(0.0);
        let high = high.max(0.0);
        if low <= high {
            Self { low, high }
        } else {
            Self { low: high, high: low }
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.low, self.high)
    }
}

impl Default for UniformJitter {
    fn default() -> Self {
        Self::new(0.5, 1.5)
    }
}

impl Jitter for UniformJitter {
    fn sample(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.low..=self.high);
        Duration::from_secs_f64(secs)
    }
}

/// Constant jitter, for deterministic pacing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixedJitter(pub Duration);

impl Jitter for FixedJitter {
    fn sample(&self) -> Duration {
        self.0
    }
}

/// Cooperative cancellation shared between a caller and the scheduler.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only ends on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// States of one logical request.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryState {
    Pending,
    Waiting { attempt: u32 },
    Attempting { attempt: u32 },
    RateLimitedRetry { attempt: u32 },
    TransportRetry { attempt: u32, error: String },
    Succeeded(Verdict),
    Exhausted { error: String },
}

impl RetryState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting { .. } => "waiting",
            Self::Attempting { .. } => "attempting",
            Self::RateLimitedRetry { .. } => "rate_limited_retry",
            Self::TransportRetry { .. } => "transport_retry",
            Self::Succeeded(_) => "succeeded",
            Self::Exhausted { .. } => "exhausted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Exhausted { .. })
    }
}

/// Drives requests through [`RetryState`] with injected sleep and jitter.
pub struct RetryScheduler {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn Jitter>,
}

impl RetryScheduler {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(UniformJitter::default()),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_jitter(mut self, jitter: Arc<dyn Jitter>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn pause(&self, duration: Duration, cancel: &CancelToken) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            _ = self.sleeper.sleep(duration) => Ok(()),
        }
    }

    /// Run one logical request to a terminal state.
    ///
    /// `build` is called once per attempt so requests are never reused.
    /// Exhaustion is reported inside the returned [`VerificationResult`];
    /// the only error is [`Error::Cancelled`].
    pub async fn run<F>(
        &self,
        verifier: &dyn Verifier,
        mut build: F,
        stats: &CallStatistics,
        cancel: &CancelToken,
    ) -> Result<VerificationResult>
    where
        F: FnMut() -> VerificationRequest + Send,
    {
        let attempts = self.policy.attempts();
        stats.record_request();

        let mut state = RetryState::Pending;
        loop {
            state = match state {
                RetryState::Pending => RetryState::Waiting { attempt: 0 },

                RetryState::Waiting { attempt } => {
                    let delay = self.policy.base_delay + self.jitter.sample();
                    debug!(
                        attempt = attempt + 1,
                        max = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "pacing before verification attempt"
                    );
                    self.pause(delay, cancel).await?;
                    RetryState::Attempting { attempt }
                }

                RetryState::Attempting { attempt } => {
                    let request = build();
                    match verifier.verify(&request).await {
                        Ok(verdict) => RetryState::Succeeded(verdict),
                        Err(AttemptError::RateLimited) => RetryState::RateLimitedRetry { attempt },
                        Err(AttemptError::Transport(error)) => {
                            RetryState::TransportRetry { attempt, error }
                        }
                    }
                }

                RetryState::RateLimitedRetry { attempt } => {
                    stats.record_rate_limited();
                    if attempt + 1 < attempts {
                        let backoff = self.policy.backoff_for(attempt);
                        warn!(
                            attempt = attempt + 1,
                            backoff_secs = backoff.as_secs_f64(),
                            "rate limited, backing off"
                        );
                        self.pause(backoff, cancel).await?;
                        RetryState::Waiting { attempt: attempt + 1 }
                    } else {
                        warn!(attempt = attempt + 1, "rate limited on final attempt");
                        RetryState::Exhausted {
                            error: AttemptError::RateLimited.to_string(),
                        }
                    }
                }

                RetryState::TransportRetry { attempt, error } => {
                    error!(attempt = attempt + 1, max = attempts, %error, "verification request failed");
                    if attempt + 1 < attempts {
                        RetryState::Waiting { attempt: attempt + 1 }
                    } else {
                        RetryState::Exhausted { error }
                    }
                }

                RetryState::Succeeded(verdict) => {
                    stats.record_success();
                    info!(
                        supported = verdict.supported,
                        confidence = verdict.confidence,
                        "verification reply"
                    );
                    return Ok(VerificationResult::success(verdict));
                }

                RetryState::Exhausted { error } => {
                    stats.record_failure();
                    error!(attempts, %error, "verification attempts exhausted");
                    return Ok(VerificationResult::failure(error));
                }
            };
        }
    }
}

impl Default for RetryScheduler {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
