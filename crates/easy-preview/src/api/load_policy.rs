// Load policy for LoadMonitor
//
// Timers and the heuristic indicator lists used to classify an embedded load.
// The lists depend on browser and server policy wording, so they are data,
// not code: load them from JSON or override them with the builder.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default time to wait for the frame's load event (3 seconds)
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 3000;

/// Default delay between the load event and the blocked-page checks (100ms)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Environment variable overriding [`LoadPolicy::timeout_ms`]
pub const TIMEOUT_ENV: &str = "EASY_PREVIEW_TIMEOUT_MS";

/// Environment variable overriding [`LoadPolicy::settle_delay_ms`]
pub const SETTLE_ENV: &str = "EASY_PREVIEW_SETTLE_MS";

/// Options controlling how a load attempt is timed and classified
///
/// All fields have defaults; a JSON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadPolicy {
    /// Time budget for the native load event, in milliseconds
    pub timeout_ms: u64,

    /// Delay after the load event before inspecting the frame, in milliseconds
    pub settle_delay_ms: u64,

    /// Phrases that mark a policy block when found in readable content
    /// (matched case-insensitively against text and markup)
    pub blocked_phrases: Vec<String>,

    /// URL schemes of the browser's internal error page (without `:`)
    pub error_page_schemes: Vec<String>,

    /// Hosts of the browser's internal error page
    pub error_page_hosts: Vec<String>,

    /// Addresses a frame reports when nothing was rendered
    pub blank_addresses: Vec<String>,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            blocked_phrases: vec![
                "refused to connect".to_string(),
                "x-frame-options".to_string(),
                "content security policy".to_string(),
                "frame-ancestors".to_string(),
            ],
            error_page_schemes: vec!["chrome-error".to_string()],
            error_page_hosts: vec!["chromewebdata".to_string()],
            blank_addresses: vec![String::new(), "about:blank".to_string()],
        }
    }
}

impl LoadPolicy {
    /// Creates a new LoadPolicy with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a policy from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).context(format!("reading {}", path.display())))?;
        let policy: LoadPolicy = serde_json::from_str(&raw)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Applies `EASY_PREVIEW_TIMEOUT_MS` / `EASY_PREVIEW_SETTLE_MS` overrides.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var(TIMEOUT_ENV).ok(), std::env::var(SETTLE_ENV).ok())
    }

    fn with_overrides(mut self, timeout: Option<String>, settle: Option<String>) -> Self {
        if let Some(raw) = timeout {
            match raw.trim().parse() {
                Ok(ms) => self.timeout_ms = ms,
                Err(_) => tracing::warn!("Ignoring {}={:?}: not a number", TIMEOUT_ENV, raw),
            }
        }
        if let Some(raw) = settle {
            match raw.trim().parse() {
                Ok(ms) => self.settle_delay_ms = ms,
                Err(_) => tracing::warn!("Ignoring {}={:?}: not a number", SETTLE_ENV, raw),
            }
        }
        self
    }

    /// Rejects policies that would classify every load immediately.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::InvalidArgument(
                "timeoutMs must be greater than zero".to_string(),
            ));
        }
        if self.blocked_phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::InvalidArgument(
                "blockedPhrases must not contain empty phrases".to_string(),
            ));
        }
        if self.error_page_schemes.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidArgument(
                "errorPageSchemes must not contain empty entries".to_string(),
            ));
        }
        if self.error_page_hosts.iter().any(|h| h.trim().is_empty()) {
            return Err(Error::InvalidArgument(
                "errorPageHosts must not contain empty entries".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the load-event time budget
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = duration_ms(timeout);
        self
    }

    /// Set the post-load settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = duration_ms(delay);
        self
    }

    /// Replace the blocked-content phrases
    pub fn blocked_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Add one blocked-content phrase
    pub fn add_blocked_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.blocked_phrases.push(phrase.into());
        self
    }

    /// Replace the error-page schemes
    pub fn error_page_schemes(mut self, schemes: Vec<String>) -> Self {
        self.error_page_schemes = schemes;
        self
    }

    /// Replace the error-page hosts
    pub fn error_page_hosts(mut self, hosts: Vec<String>) -> Self {
        self.error_page_hosts = hosts;
        self
    }

    /// Load-event budget as a Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Settle delay as a Duration
    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
