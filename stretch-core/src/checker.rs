//! Single-text relevance checking.
//!
//! [`FactChecker`] ties together a [`Verifier`], a [`RequestTemplate`], the
//! retry scheduler and the [`RelevancePolicy`].
//!
//! # Example
//!
//! ```rust,ignore
//! use stretch_core::{CheckerConfig, FactChecker};
//!
//! let checker = FactChecker::from_config(&CheckerConfig::classifier(api_key))?;
//! let outcome = checker.classify("정적 스트레칭은 근육을 천천히 늘리는 방법입니다.").await?;
//! println!("{} ({})", outcome.is_relevant, outcome.classification_label);
//! ```

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::CheckerConfig;
use crate::error::Result;
use crate::policy::RelevancePolicy;
use crate::retry::{CancelToken, Jitter, RetryScheduler, Sleeper};
use crate::stats::{CallStatistics, StatsSnapshot};
use crate::types::{ClassificationOutcome, VerificationResult};
use crate::verify::{HttpVerifier, RequestTemplate, Verifier};

/// Checks and classifies texts against the verification endpoint.
pub struct FactChecker {
    verifier: Arc<dyn Verifier>,
    template: RequestTemplate,
    policy: RelevancePolicy,
    scheduler: RetryScheduler,
    stats: Arc<CallStatistics>,
    cancel: CancelToken,
}

impl FactChecker {
    /// Build a checker around an existing verifier.
    pub fn new(verifier: Arc<dyn Verifier>, config: &CheckerConfig) -> Self {
        Self {
            verifier,
            template: config.template.clone(),
            policy: RelevancePolicy::new().with_confidence_threshold(config.confidence_threshold),
            scheduler: RetryScheduler::new(config.retry_policy()),
            stats: Arc::new(CallStatistics::new()),
            cancel: CancelToken::new(),
        }
    }

    /// Build a checker talking HTTP to the configured endpoint.
    pub fn from_config(config: &CheckerConfig) -> Result<Self> {
        config.validate()?;
        let verifier = HttpVerifier::new(config.verifier_config())?;
        Ok(Self::new(Arc::new(verifier), config))
    }

    pub fn with_policy(mut self, policy: RelevancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_template(mut self, template: RequestTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.scheduler = self.scheduler.with_sleeper(sleeper);
        self
    }

    pub fn with_jitter(mut self, jitter: Arc<dyn Jitter>) -> Self {
        self.scheduler = self.scheduler.with_jitter(jitter);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Share counters with another checker.
    pub fn with_stats(mut self, stats: Arc<CallStatistics>) -> Self {
        self.stats = stats;
        self
    }

    /// Ask the endpoint whether `text` is relevant.
    ///
    /// Exhausted retries come back as a failed [`VerificationResult`]; only
    /// cancellation is an `Err`.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn check_relevance(&self, text: &str) -> Result<VerificationResult> {
        let template = &self.template;
        self.scheduler
            .run(
                self.verifier.as_ref(),
                || template.build(text),
                &self.stats,
                &self.cancel,
            )
            .await
    }

    /// Verify `text` and apply the relevance policy.
    pub async fn classify(&self, text: &str) -> Result<ClassificationOutcome> {
        let result = self.check_relevance(text).await?;
        let outcome = self.policy.outcome(text, &result);
        debug!(
            relevant = outcome.is_relevant,
            label = %outcome.classification_label,
            keywords = outcome.matched_keywords.len(),
            "classified text"
        );
        Ok(outcome)
    }

    pub fn policy(&self) -> &RelevancePolicy {
        &self.policy
    }

    pub fn template(&self) -> &RequestTemplate {
        &self.template
    }

    pub fn stats(&self) -> &CallStatistics {
        &self.stats
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}
