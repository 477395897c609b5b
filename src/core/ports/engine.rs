//! HTTP engine port
//!
//! The engine is the external collaborator that actually listens. It is
//! created from a dispatcher, an optional configuration and a set of listen
//! URIs, then started, stopped and disposed.

use std::sync::Arc;

use thiserror::Error;

use super::Dispatcher;
use crate::core::models::{HostConfig, ListenUri};

/// Errors raised by an engine while starting
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine cannot serve this scheme
    #[error("unsupported URI scheme '{scheme}' in {uri}")]
    UnsupportedScheme {
        /// The offending scheme
        scheme: String,
        /// The URI it came from
        uri: String,
    },

    /// The URI names no host to bind
    #[error("URI has no host: {0}")]
    MissingHost(String),

    /// Binding a socket failed
    #[error("failed to listen on {address}: {source}")]
    Bind {
        /// The socket address that was attempted
        address: String,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other engine failure
    #[error("{0}")]
    Other(String),
}

/// Factory for engine handles
pub trait HostEngine {
    /// The live instance type
    type Handle: EngineHandle;

    /// Build a host; nothing listens until [`EngineHandle::start`]
    ///
    /// When `config` is `None` the engine applies its own defaults.
    fn create(
        &self,
        dispatcher: Arc<dyn Dispatcher>,
        config: Option<&HostConfig>,
        uris: &[ListenUri],
    ) -> Self::Handle;
}

/// A created engine instance
pub trait EngineHandle {
    /// Begin listening on every configured URI
    fn start(&mut self) -> Result<(), EngineError>;

    /// Stop listening
    fn stop(&mut self);

    /// Release everything the handle holds
    fn dispose(self)
    where
        Self: Sized;
}
