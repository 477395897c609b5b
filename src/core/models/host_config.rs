//! Engine host configuration
//!
//! Passed through the controller untouched; only the engine reads it.

use serde::{Deserialize, Serialize};

/// Default cap on a request body, 10 MiB
pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

/// Options handed to the engine when a host is created
///
/// Missing keys take their defaults; unknown keys are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Bind every interface when a URI names `localhost`
    pub rewrite_localhost: bool,
    /// Allow chunked transfer encoding on responses
    pub allow_chunked_encoding: bool,
    /// Request threads per bound socket
    pub worker_threads: usize,
    /// Largest request body accepted; bigger bodies get a 413
    pub max_body_bytes: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            rewrite_localhost: true,
            allow_chunked_encoding: true,
            worker_threads: 1,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl HostConfig {
    /// Number of worker threads to spawn, never zero
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        if self.worker_threads == 0 { 1 } else { self.worker_threads }
    }
}
