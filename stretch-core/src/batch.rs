//! Order-preserving batch classification.
//!
//! Items are processed one at a time, so the pacing delay in the retry
//! scheduler is the only rate control. `batch_size` only groups items for
//! progress reporting. Every item goes through the relevance policy; a
//! failed item yields `false` and one bad item never aborts the rest.
//! Cancellation is the only error that stops a batch.

use tracing::info;

use crate::checker::FactChecker;
use crate::config::{CheckerConfig, DEFAULT_BATCH_SIZE};
use crate::error::Result;
use crate::stats::CallStatistics;
use crate::types::{CandidateText, ClassificationOutcome, VerificationResult};

/// Runs a [`FactChecker`] over many texts.
pub struct BatchCoordinator {
    checker: FactChecker,
    batch_size: usize,
}

impl BatchCoordinator {
    pub fn new(checker: FactChecker) -> Self {
        Self {
            checker,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Coordinator using the batch size from `config`.
    pub fn from_config(checker: FactChecker, config: &CheckerConfig) -> Self {
        Self::new(checker).with_batch_size(config.batch_size)
    }

    /// Group size for progress logs (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn checker(&self) -> &FactChecker {
        &self.checker
    }

    pub fn stats(&self) -> &CallStatistics {
        self.checker.stats()
    }

    /// Raw verification result per text, aligned with the input.
    ///
    /// The relevance policy is not applied; see [`process_batch`](Self::process_batch).
    pub async fn check_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<VerificationResult>> {
        let mut results = Vec::with_capacity(texts.len());
        let chunks = chunk_count(texts.len(), self.batch_size);

        for (index, chunk) in texts.chunks(self.batch_size).enumerate() {
            info!(
                batch = index + 1,
                batches = chunks,
                size = chunk.len(),
                "processing batch"
            );
            for text in chunk {
                results.push(self.checker.check_relevance(text.as_ref()).await?);
            }
        }

        Ok(results)
    }

    /// Relevance verdict per text, aligned with the input.
    ///
    /// Each verdict is the policy's `is_relevant`; failed items are `false`.
    pub async fn process_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<bool>> {
        let outcomes = self.classify_batch(texts).await?;
        Ok(outcomes.iter().map(|o| o.is_relevant).collect())
    }

    /// Full classification per text, aligned with the input.
    pub async fn classify_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<ClassificationOutcome>> {
        let mut outcomes = Vec::with_capacity(texts.len());
        let chunks = chunk_count(texts.len(), self.batch_size);

        for (index, chunk) in texts.chunks(self.batch_size).enumerate() {
            info!(
                batch = index + 1,
                batches = chunks,
                size = chunk.len(),
                "classifying batch"
            );
            for text in chunk {
                outcomes.push(self.checker.classify(text.as_ref()).await?);
            }
        }

        let relevant = outcomes.iter().filter(|o| o.is_relevant).count();
        info!(total = outcomes.len(), relevant, "batch classification complete");
        Ok(outcomes)
    }

    /// Relevance verdicts for candidates, by their text.
    pub async fn process_candidates(&self, candidates: &[CandidateText]) -> Result<Vec<bool>> {
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        self.process_batch(&texts).await
    }
}

fn chunk_count(len: usize, size: usize) -> usize {
    len.div_ceil(size.max(1))
}
