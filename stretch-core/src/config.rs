//! Checker configuration.
//!
//! The bearer token comes from `ELICE_API_KEY`. Everything else has a
//! default and can be overridden with `STRETCH_*` variables or the
//! `with_*` builders.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::policy::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::retry::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RATE_LIMIT_DELAY};
use crate::verify::{RequestTemplate, VerifierConfig, DEFAULT_ENDPOINT};

/// Default chunk size for batch progress reporting.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Which request shape and timeout to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckerMode {
    /// Text embedded in the service context, fixed claim, 15 s timeout
    #[default]
    FactCheck,
    /// Text sent as the claim, 10 s timeout
    Classify,
}

impl std::str::FromStr for CheckerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fact_check" | "fact-check" | "factcheck" => Ok(Self::FactCheck),
            "classify" | "classifier" => Ok(Self::Classify),
            other => Err(Error::config(format!("unknown checker mode: {}", other))),
        }
    }
}

/// Settings for a [`FactChecker`](crate::checker::FactChecker).
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Bearer token for the verification endpoint
    pub api_key: String,
    /// Endpoint URL
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per request
    pub max_retries: u32,
    /// Chunk size for batch progress
    pub batch_size: usize,
    /// Fixed pacing delay before each attempt
    pub rate_limit_delay: Duration,
    /// Request construction
    pub template: RequestTemplate,
    /// Confidence at which the verifier is decisive
    pub confidence_threshold: f64,
}

impl CheckerConfig {
    const ENV_API_KEY: &'static str = "ELICE_API_KEY";
    const ENV_ENDPOINT: &'static str = "STRETCH_VERIFY_URL";
    const ENV_TIMEOUT: &'static str = "STRETCH_VERIFY_TIMEOUT_SECS";
    const ENV_MAX_RETRIES: &'static str = "STRETCH_MAX_RETRIES";
    const ENV_BATCH_SIZE: &'static str = "STRETCH_BATCH_SIZE";
    const ENV_RATE_LIMIT_DELAY: &'static str = "STRETCH_RATE_LIMIT_DELAY";

    /// Preset for filtering dataset entries against the service description.
    pub fn fact_checker(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 15,
            max_retries: DEFAULT_MAX_RETRIES,
            batch_size: DEFAULT_BATCH_SIZE,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            template: RequestTemplate::service_check(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    /// Preset for classifying free text as a stretching claim.
    pub fn classifier(api_key: impl Into<String>) -> Self {
        Self {
            timeout_secs: 10,
            template: RequestTemplate::stretching_claim(),
            ..Self::fact_checker(api_key)
        }
    }

    pub fn for_mode(mode: CheckerMode, api_key: impl Into<String>) -> Self {
        match mode {
            CheckerMode::FactCheck => Self::fact_checker(api_key),
            CheckerMode::Classify => Self::classifier(api_key),
        }
    }

    /// Load from the process environment.
    ///
    /// A missing or empty `ELICE_API_KEY` is an error.
    pub fn from_env(mode: CheckerMode) -> Result<Self> {
        Self::from_lookup(mode, |name| std::env::var(name).ok())
    }

    /// Load using `lookup` in place of the environment.
    pub fn from_lookup<F>(mode: CheckerMode, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(Self::ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::config(format!("{} is not set", Self::ENV_API_KEY)))?;

        let mut config = Self::for_mode(mode, api_key);

        if let Some(url) = lookup(Self::ENV_ENDPOINT).filter(|u| !u.trim().is_empty()) {
            config.endpoint = url;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, Self::ENV_TIMEOUT)? {
            config.timeout_secs = secs;
        }
        if let Some(n) = parse_var::<u32, _>(&lookup, Self::ENV_MAX_RETRIES)? {
            config.max_retries = n;
        }
        if let Some(n) = parse_var::<usize, _>(&lookup, Self::ENV_BATCH_SIZE)? {
            config.batch_size = n;
        }
        if let Some(secs) = parse_var::<f64, _>(&lookup, Self::ENV_RATE_LIMIT_DELAY)? {
            config.rate_limit_delay = seconds(secs, Self::ENV_RATE_LIMIT_DELAY)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    pub fn with_template(mut self, template: RequestTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Reject values that cannot drive a checker.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(Error::config("max_retries must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout must be at least 1 second"));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }

    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig::new(self.api_key.clone())
            .with_endpoint(self.endpoint.clone())
            .with_timeout(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.rate_limit_delay)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::config(format!("{}={:?}: {}", name, raw, e))),
        _ => Ok(None),
    }
}

/// Seconds as a Duration. Values a Duration cannot hold are configuration
/// errors.
pub fn seconds(secs: f64, what: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| {
        Error::config(format!(
            "{} must be a non-negative number of seconds, got {}: {}",
            what, secs, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_fact_checker_defaults() {
        let config = CheckerConfig::fact_checker("key");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.rate_limit_delay, Duration::from_secs(2));
        assert_eq!(config.confidence_threshold, 0.95);
        assert!(matches!(config.template, RequestTemplate::Templated { .. }));
        config.validate().unwrap();
    }

    #[test]
    fn test_classifier_preset() {
        let config = CheckerConfig::classifier("key");
        assert_eq!(config.timeout_secs, 10);
        assert!(matches!(config.template, RequestTemplate::TextAsClaim { .. }));
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = CheckerConfig::from_lookup(CheckerMode::FactCheck, lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("ELICE_API_KEY"));

        let err =
            CheckerConfig::from_lookup(CheckerMode::FactCheck, lookup(&[("ELICE_API_KEY", " ")]))
                .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = CheckerConfig::from_lookup(
            CheckerMode::Classify,
            lookup(&[
                ("ELICE_API_KEY", "secret"),
                ("STRETCH_VERIFY_URL", "http://localhost:8080/check"),
                ("STRETCH_MAX_RETRIES", "3"),
                ("STRETCH_BATCH_SIZE", "5"),
                ("STRETCH_RATE_LIMIT_DELAY", "0.25"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.endpoint, "http://localhost:8080/check");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.rate_limit_delay, Duration::from_millis(250));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_bad_env_value_reports_variable() {
        let err = CheckerConfig::from_lookup(
            CheckerMode::FactCheck,
            lookup(&[("ELICE_API_KEY", "k"), ("STRETCH_MAX_RETRIES", "many")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("STRETCH_MAX_RETRIES"));

        let err = CheckerConfig::from_lookup(
            CheckerMode::FactCheck,
            lookup(&[("ELICE_API_KEY", "k"), ("STRETCH_RATE_LIMIT_DELAY", "-1")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("STRETCH_RATE_LIMIT_DELAY"));
    }

    #[test]
    fn test_huge_delay_is_config_error() {
        let err = CheckerConfig::from_lookup(
            CheckerMode::FactCheck,
            lookup(&[("ELICE_API_KEY", "k"), ("STRETCH_RATE_LIMIT_DELAY", "1e20")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("STRETCH_RATE_LIMIT_DELAY")));

        assert!(seconds(f64::NAN, "delay").is_err());
        assert!(seconds(f64::INFINITY, "delay").is_err());
        assert_eq!(seconds(1.5, "delay").unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(CheckerConfig::fact_checker("k").with_batch_size(0).validate().is_err());
        assert!(CheckerConfig::fact_checker("k").with_max_retries(0).validate().is_err());
        assert!(CheckerConfig::fact_checker("k")
            .with_confidence_threshold(1.5)
            .validate()
            .is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("fact-check".parse::<CheckerMode>().unwrap(), CheckerMode::FactCheck);
        assert_eq!("Classify".parse::<CheckerMode>().unwrap(), CheckerMode::Classify);
        assert!("other".parse::<CheckerMode>().is_err());
    }

    #[test]
    fn test_derived_settings() {
        let config = CheckerConfig::fact_checker("k")
            .with_endpoint("http://x/check")
            .with_max_retries(3)
            .with_rate_limit_delay(Duration::from_secs(1));
        let verifier = config.verifier_config();
        assert_eq!(verifier.endpoint, "http://x/check");
        assert_eq!(verifier.timeout_secs, 15);
        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
    }
}
