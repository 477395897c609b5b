//! Host lifecycle controller
//!
//! `HostController` owns at most one running engine handle and decides when
//! to create, start, stop and dispose it.
//!
//! ## State machine
//!
//! ```text
//!            start() ok                  start() ok (restart)
//! Stopped ─────────────────▶ Running ◀───────────────┐
//!    ▲                          │ └───────────────────┘
//!    └──────────────────────────┘
//!      stop() / start() error / drop
//! ```
//!
//! Changing the dispatcher, the listen URIs or the host config while
//! running restarts the engine so it picks up the change, unless
//! [`HostController::wait`] was called first. That allows batching:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use nancy_pack::adapters::{EchoDispatcher, TinyHttpEngine};
//! use nancy_pack::core::models::HostConfig;
//! use nancy_pack::core::services::HostController;
//!
//! let mut host = HostController::new(TinyHttpEngine);
//! host.wait()
//!     .set_dispatcher(Arc::new(EchoDispatcher))?
//!     .set_listen_uris(["http://localhost:8080/", "http://localhost:8081/api/"])?
//!     .set_host_config(Some(HostConfig::default()))?
//!     .start()?;
//! # Ok::<(), nancy_pack::core::services::HostError>(())
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

use crate::core::models::{HostConfig, ListenUri, UriError};
use crate::core::ports::{Dispatcher, EngineError, EngineHandle, HostEngine};

/// Errors returned by controller operations
#[derive(Debug, Error)]
pub enum HostError {
    /// Rejected input; nothing was changed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `start` was called before a dispatcher was set
    #[error("no dispatcher has been set")]
    MissingDispatcher,

    /// The engine failed to start; the controller is stopped
    #[error(transparent)]
    EngineStart(#[from] EngineError),
}

/// A batch of changes applied with a single restart
///
/// Fields left unset keep their current value.
#[derive(Default)]
pub struct Reconfigure {
    dispatcher: Option<Arc<dyn Dispatcher>>,
    listen_uris: Option<Vec<String>>,
    host_config: Option<Option<HostConfig>>,
}

impl Reconfigure {
    /// Start an empty batch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dispatcher
    #[must_use]
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Replace the listen URIs
    #[must_use]
    pub fn listen_uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.listen_uris = Some(uris.into_iter().map(|u| u.as_ref().to_string()).collect());
        self
    }

    /// Replace the host config (`None` clears it)
    #[must_use]
    pub fn host_config(mut self, config: Option<HostConfig>) -> Self {
        self.host_config = Some(config);
        self
    }

    /// True when the batch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dispatcher.is_none() && self.listen_uris.is_none() && self.host_config.is_none()
    }
}

impl std::fmt::Debug for Reconfigure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconfigure")
            .field("dispatcher", &self.dispatcher.as_ref().map(|_| "<dispatcher>"))
            .field("listen_uris", &self.listen_uris)
            .field("host_config", &self.host_config)
            .finish()
    }
}

/// Controls one embedded engine instance
///
/// Dropping the controller stops and disposes a running engine.
pub struct HostController<E: HostEngine> {
    engine: E,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    listen_uris: Vec<ListenUri>,
    host_config: Option<HostConfig>,
    running: Option<E::Handle>,
    waiting: bool,
    output: Box<dyn Write + Send>,
}

impl<E: HostEngine> HostController<E> {
    /// Create a stopped controller that reports to stdout
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self::with_output(engine, io::stdout())
    }

    /// Create a stopped controller that reports to `output`
    #[must_use]
    pub fn with_output(engine: E, output: impl Write + Send + 'static) -> Self {
        Self {
            engine,
            dispatcher: None,
            listen_uris: ListenUri::defaults(),
            host_config: None,
            running: None,
            waiting: false,
            output: Box::new(output),
        }
    }

    /// The URI set a fresh controller listens on
    #[must_use]
    pub fn default_uris() -> Vec<ListenUri> {
        ListenUri::defaults()
    }

    /// The running handle, if any
    #[must_use]
    pub const fn handle(&self) -> Option<&E::Handle> {
        self.running.as_ref()
    }

    /// The current dispatcher
    #[must_use]
    pub const fn dispatcher(&self) -> Option<&Arc<dyn Dispatcher>> {
        self.dispatcher.as_ref()
    }

    /// The current listen URIs, in assignment order
    #[must_use]
    pub fn listen_uris(&self) -> &[ListenUri] {
        &self.listen_uris
    }

    /// The current host config
    #[must_use]
    pub const fn host_config(&self) -> Option<&HostConfig> {
        self.host_config.as_ref()
    }

    /// True while an engine handle is live
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.running.is_some()
    }

    /// True while auto-restart is suppressed
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Replace the dispatcher, restarting a running engine unless waiting
    pub fn set_dispatcher(&mut self, dispatcher: Arc<dyn Dispatcher>) -> Result<&mut Self, HostError> {
        self.dispatcher = Some(dispatcher);
        self.apply_and_maybe_restart()
    }

    /// Like [`Self::set_dispatcher`], for hosts that hold nullable values
    ///
    /// `None` is rejected with [`HostError::InvalidArgument`].
    pub fn set_dispatcher_opt(
        &mut self,
        dispatcher: Option<Arc<dyn Dispatcher>>,
    ) -> Result<&mut Self, HostError> {
        let dispatcher = dispatcher
            .ok_or_else(|| HostError::InvalidArgument("dispatcher must not be null".to_string()))?;
        self.set_dispatcher(dispatcher)
    }

    /// Replace the listen URIs, restarting a running engine unless waiting
    ///
    /// Every entry must be an absolute URI ending in `/`. If any entry is
    /// invalid the whole set is rejected and the previous value is kept.
    pub fn set_listen_uris<I, S>(&mut self, uris: I) -> Result<&mut Self, HostError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_listen_uris_opt(uris.into_iter().map(Some))
    }

    /// Like [`Self::set_listen_uris`], for hosts that hold nullable entries
    ///
    /// A `None` entry rejects the whole set.
    pub fn set_listen_uris_opt<I, S>(&mut self, uris: I) -> Result<&mut Self, HostError>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        self.listen_uris = parse_uris(uris)?;
        self.apply_and_maybe_restart()
    }

    /// Replace the host config, restarting a running engine unless waiting
    pub fn set_host_config(&mut self, config: Option<HostConfig>) -> Result<&mut Self, HostError> {
        self.host_config = config;
        self.apply_and_maybe_restart()
    }

    /// Apply a batch of changes with at most one restart
    ///
    /// URIs are validated before anything is stored. An empty batch does
    /// nothing.
    pub fn reconfigure(&mut self, changes: Reconfigure) -> Result<&mut Self, HostError> {
        if changes.is_empty() {
            return Ok(self);
        }

        let listen_uris = changes
            .listen_uris
            .map(|uris| parse_uris(uris.into_iter().map(Some)))
            .transpose()?;

        if let Some(dispatcher) = changes.dispatcher {
            self.dispatcher = Some(dispatcher);
        }
        if let Some(listen_uris) = listen_uris {
            self.listen_uris = listen_uris;
        }
        if let Some(host_config) = changes.host_config {
            self.host_config = host_config;
        }

        self.apply_and_maybe_restart()
    }

    /// Start the engine, stopping any running instance first
    ///
    /// On engine failure the new handle is discarded, the controller stays
    /// stopped and the engine's error is returned as is.
    pub fn start(&mut self) -> Result<&mut Self, HostError> {
        let dispatcher = self.dispatcher.clone().ok_or(HostError::MissingDispatcher)?;

        self.stop();

        debug!("creating host for {} URI(s)", self.listen_uris.len());
        let mut handle = self
            .engine
            .create(dispatcher, self.host_config.as_ref(), &self.listen_uris);

        if let Err(err) = handle.start() {
            debug!("host failed to start: {err}");
            handle.dispose();
            return Err(err.into());
        }

        self.running = Some(handle);
        self.waiting = false;
        self.announce_hosting();

        Ok(self)
    }

    /// Stop and dispose the running engine; no-op when stopped
    pub fn stop(&mut self) -> &mut Self {
        if let Some(mut handle) = self.running.take() {
            handle.stop();
            handle.dispose();
            self.report("Stopped hosting Nancy");
        }

        self
    }

    /// Suppress auto-restart until the next successful `start`
    pub const fn wait(&mut self) -> &mut Self {
        self.waiting = true;
        self
    }

    /// Stop the engine and drop the controller
    pub fn release(mut self) {
        self.stop();
    }

    fn apply_and_maybe_restart(&mut self) -> Result<&mut Self, HostError> {
        if self.is_started() && !self.waiting {
            debug!("configuration changed while running, restarting");
            return self.start();
        }

        Ok(self)
    }

    fn announce_hosting(&mut self) {
        if self.listen_uris.is_empty() {
            self.report("NOT hosting Nancy at any URL");
            return;
        }

        let lines: Vec<String> = self
            .listen_uris
            .iter()
            .map(|uri| format!("Hosting Nancy at: {uri}"))
            .collect();
        for line in &lines {
            self.report(line);
        }
    }

    fn report(&mut self, line: &str) {
        if let Err(err) = writeln!(self.output, "{line}").and_then(|()| self.output.flush()) {
            warn!("failed to write host status: {err}");
        }
    }
}

impl<E: HostEngine> Drop for HostController<E> {
    fn drop(&mut self) {
        if self.is_started() {
            debug!("controller dropped while running, stopping host");
        }
        self.stop();
    }
}

impl<E: HostEngine> std::fmt::Debug for HostController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostController")
            .field("listen_uris", &self.listen_uris)
            .field("host_config", &self.host_config)
            .field("has_dispatcher", &self.dispatcher.is_some())
            .field("started", &self.is_started())
            .field("waiting", &self.waiting)
            .finish_non_exhaustive()
    }
}

fn parse_uris<I, S>(uris: I) -> Result<Vec<ListenUri>, HostError>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    uris.into_iter()
        .enumerate()
        .map(|(index, uri)| {
            uri.ok_or(UriError::Missing)
                .and_then(|uri| ListenUri::parse(uri.as_ref()))
                .map_err(|err| HostError::InvalidArgument(format!("listen URI #{index}: {err}")))
        })
        .collect()
}
