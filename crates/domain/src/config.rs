//! Dispatcher configuration loaded from environment variables.

use std::str::FromStr;

use crate::error::KernelError;

/// How the dispatcher reacts when a handler fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and keep delivering to the remaining handlers.
    #[default]
    Isolate,
    /// Stop delivery and return the error to the caller.
    FailFast,
}

impl FromStr for FailurePolicy {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "fail-fast" | "fail_fast" => Ok(Self::FailFast),
            other => Err(KernelError::Configuration(format!(
                "unknown failure policy `{other}` (expected `isolate` or `fail-fast`)"
            ))),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Isolate => write!(f, "isolate"),
            Self::FailFast => write!(f, "fail-fast"),
        }
    }
}

/// Domain event dispatcher configuration.
///
/// Reads from environment variables:
/// - `DOMAIN_EVENTS_FAILURE_POLICY`: `isolate` or `fail-fast` (default: `isolate`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub failure_policy: FailurePolicy,
    pub log_level: String,
}

impl DispatcherConfig {
    pub const FAILURE_POLICY_VAR: &'static str = "DOMAIN_EVENTS_FAILURE_POLICY";
    pub const LOG_LEVEL_VAR: &'static str = "RUST_LOG";

    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, KernelError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, KernelError> {
        let failure_policy = match lookup(Self::FAILURE_POLICY_VAR) {
            Some(raw) => raw.parse()?,
            None => FailurePolicy::default(),
        };

        Ok(Self {
            failure_policy,
            log_level: lookup(Self::LOG_LEVEL_VAR).unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Isolate,
            log_level: "info".to_string(),
        }
    }
}
