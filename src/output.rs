//! Output formatting for human and JSON modes
//!
//! This module provides structured output that can be rendered either as
//! human-readable text or machine-parseable JSON.

use serde::Serialize;

use crate::config::PackConfig;
use crate::core::models::ListenUri;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Verdict for one URI passed to `check-uris`
#[derive(Debug, Serialize)]
pub struct UriVerdict {
    /// The input as given
    pub input: String,
    /// Normalized form, when valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
    /// Why it was rejected, when invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UriVerdict {
    /// Validate one input
    #[must_use]
    pub fn check(input: &str) -> Self {
        match ListenUri::parse(input) {
            Ok(uri) => Self {
                input: input.to_string(),
                normalized: Some(uri.to_string()),
                error: None,
            },
            Err(err) => Self {
                input: input.to_string(),
                normalized: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// True when the input is a valid listen URI
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a `check-uris` run
#[derive(Debug, Serialize)]
pub struct UriCheckResult {
    /// Whether every URI is valid
    pub valid: bool,
    /// Per-URI verdicts, in input order
    pub uris: Vec<UriVerdict>,
}

impl UriCheckResult {
    /// Validate every input
    #[must_use]
    pub fn check<S: AsRef<str>>(inputs: &[S]) -> Self {
        let uris: Vec<UriVerdict> = inputs.iter().map(|u| UriVerdict::check(u.as_ref())).collect();
        Self {
            valid: uris.iter().all(UriVerdict::is_valid),
            uris,
        }
    }

    /// Number of rejected URIs
    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.uris.iter().filter(|u| !u.is_valid()).count()
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        for verdict in &self.uris {
            match (&verdict.normalized, &verdict.error) {
                (Some(normalized), _) if *normalized == verdict.input => {
                    println!("ok       {normalized}");
                },
                (Some(normalized), _) => println!("ok       {} -> {normalized}", verdict.input),
                (None, Some(error)) => println!("invalid  {}: {error}", verdict.input),
                (None, None) => println!("invalid  {}", verdict.input),
            }
        }

        if !self.valid {
            println!("\n{} invalid URI(s)", self.invalid_count());
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

/// Result of `config show`
#[derive(Debug, Serialize)]
pub struct ConfigShowResult {
    /// Where the config came from
    pub source: String,
    /// The effective config
    pub config: PackConfig,
}

impl ConfigShowResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("# source: {}", self.source);
        println!("{}", toml::to_string_pretty(&self.config).unwrap_or_default());
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

/// Snapshot of a host, printed by `serve` in JSON mode
#[derive(Debug, Serialize)]
pub struct HostStatus {
    /// Whether an engine handle is live
    pub started: bool,
    /// Whether auto-restart is suppressed
    pub waiting: bool,
    /// Configured listen URIs
    pub uris: Vec<String>,
    /// Addresses actually bound
    pub bound: Vec<String>,
}

impl HostStatus {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                for address in &self.bound {
                    println!("Bound {address}");
                }
            },
            OutputMode::Json => {
                println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
            },
        }
    }
}

/// Generic operation result for simple commands
#[derive(Debug, Serialize)]
pub struct OperationResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
}

impl OperationResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => println!("{}", self.message),
            OutputMode::Json => {
                println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
            },
        }
    }
}
