//! # stretch-core
//!
//! Relevance filtering for stretching and pain-management material, backed
//! by a rate-limited fact-verification endpoint.
//!
//! ## Core Components
//!
//! - **Verify**: HTTP client and request templates for the verification API
//! - **Retry**: Paced, bounded retries with rate-limit backoff and cancellation
//! - **Policy**: Keyword, confidence and context-pattern decision table
//! - **Checker**: Single-text checking and classification
//! - **Batch**: Order-preserving processing of many texts
//! - **Dataset**: Filtering of crawled muscle/exercise datasets
//!
//! ## Example
//!
//! ```rust,ignore
//! use stretch_core::{BatchCoordinator, CheckerConfig, CheckerMode, FactChecker};
//!
//! let config = CheckerConfig::from_env(CheckerMode::Classify)?;
//! let coordinator = BatchCoordinator::new(FactChecker::from_config(&config)?);
//!
//! let outcomes = coordinator
//!     .classify_batch(&["정적 스트레칭은 근육을 천천히 늘리는 방법입니다."])
//!     .await?;
//! println!("{}", outcomes[0].classification_label);
//! println!("{}", coordinator.stats().snapshot());
//! ```

pub mod batch;
pub mod checker;
pub mod config;
pub mod dataset;
pub mod error;
pub mod policy;
pub mod retry;
pub mod stats;
pub mod types;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use batch::BatchCoordinator;
pub use checker::FactChecker;
pub use config::{CheckerConfig, CheckerMode, DEFAULT_BATCH_SIZE};
pub use dataset::{
    filter_dataset, run_filter, FilterOptions, FilterSummary, MuscleDataset, MuscleEntry,
    Selection,
};
pub use error::{AttemptError, Error, Result};
pub use policy::{
    Decision, KeywordSet, PatternSet, RelevancePolicy, DEFAULT_CONFIDENCE_THRESHOLD,
    STRETCHING_KEYWORDS,
};
pub use retry::{
    CancelToken, FixedJitter, Jitter, RetryPolicy, RetryScheduler, RetryState, Sleeper,
    TokioSleeper, UniformJitter,
};
pub use stats::{CallStatistics, StatsSnapshot};
pub use types::{
    CandidateText, ClassificationLabel, ClassificationOutcome, Verdict, VerificationRequest,
    VerificationResult,
};
pub use verify::{HttpVerifier, RequestTemplate, Verifier, VerifierConfig};
