//! Deterministic doubles for verifier, sleep, and jitter.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::AttemptError;
use crate::retry::Sleeper;
use crate::types::{Verdict, VerificationRequest};
use crate::verify::Verifier;

type Reply = std::result::Result<Verdict, AttemptError>;

/// Replays a fixed sequence of replies, then reports transport errors.
pub struct ScriptedVerifier {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<VerificationRequest>>,
}

impl ScriptedVerifier {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<VerificationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Verifier for ScriptedVerifier {
    async fn verify(&self, request: &VerificationRequest) -> Reply {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AttemptError::transport("script exhausted")))
    }
}

/// Answers each request from a function of its claim.
pub struct ClaimVerifier<F> {
    reply: F,
    calls: Mutex<Vec<String>>,
}

impl<F> ClaimVerifier<F>
where
    F: Fn(&str) -> Reply + Send + Sync,
{
    pub fn new(reply: F) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn claims(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<F> Verifier for ClaimVerifier<F>
where
    F: Fn(&str) -> Reply + Send + Sync,
{
    async fn verify(&self, request: &VerificationRequest) -> Reply {
        self.calls.lock().unwrap().push(request.claim.clone());
        (self.reply)(&request.claim)
    }
}

/// Records requested durations and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}

/// Never wakes up; only cancellation gets past it.
pub struct StalledSleeper;

#[async_trait]
impl Sleeper for StalledSleeper {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}
