//! Verification backend abstraction.
//!
//! A [`Verifier`] performs one call against an entailment / fact-check
//! service and reports either a [`Verdict`](crate::types::Verdict) or an
//! [`AttemptError`](crate::error::AttemptError). The HTTP implementation
//! talks to the hosted check endpoint with bearer authentication.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stretch_core::verify::{HttpVerifier, RequestTemplate, Verifier, VerifierConfig};
//!
//! let verifier = HttpVerifier::new(VerifierConfig::new(api_key).with_timeout(15))?;
//! let request = RequestTemplate::service_check().build("대흉근 스트레칭 방법");
//! match verifier.verify(&request).await {
//!     Ok(verdict) => println!("supported={} ({:.2})", verdict.supported, verdict.confidence),
//!     Err(e) => println!("attempt failed: {}", e),
//! }
//! ```

mod client;
mod template;

pub use client::{
    interpret_response, HttpVerifier, Verifier, VerifierConfig, DEFAULT_ENDPOINT,
};
pub use template::{
    RequestTemplate, SERVICE_CLAIM, SERVICE_CONTEXT, STRETCHING_CONTEXT,
};
