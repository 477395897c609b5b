//! `tiny_http` engine adapter
//!
//! Binds one `tiny_http::Server` per distinct socket address and serves every
//! listen URI registered on it. Requests are handed to the dispatcher with
//! their path made relative to the matching URI prefix; anything outside
//! every prefix gets a 404.

use std::io::{Cursor, Read as _};
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};
use tiny_http::{Header, Request, Response, Server, StatusCode};

use crate::core::models::{HostConfig, ListenUri};
use crate::core::ports::{
    DispatchRequest, DispatchResponse, Dispatcher, EngineError, EngineHandle, HostEngine,
};

/// How long a worker blocks before rechecking the stop flag
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Engine factory backed by `tiny_http`
#[derive(Debug, Clone, Copy, Default)]
pub struct TinyHttpEngine;

impl HostEngine for TinyHttpEngine {
    type Handle = TinyHttpHost;

    fn create(
        &self,
        dispatcher: Arc<dyn Dispatcher>,
        config: Option<&HostConfig>,
        uris: &[ListenUri],
    ) -> TinyHttpHost {
        TinyHttpHost::new(dispatcher, config.copied().unwrap_or_default(), uris.to_vec())
    }
}

/// A URI prefix served on a bound socket
#[derive(Debug, Clone)]
struct Mount {
    base_uri: String,
    base_path: String,
}

/// One bound socket and its worker threads
struct Listener {
    address: String,
    server: Arc<Server>,
    stopping: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl Listener {
    fn shutdown(self) {
        self.stopping.store(true, Ordering::SeqCst);
        for _ in &self.workers {
            self.server.unblock();
        }

        for worker in self.workers {
            if worker.join().is_err() {
                warn!("worker thread for {} panicked", self.address);
            }
        }

        debug!("closed listener on {}", self.address);
    }
}

/// A host created by [`TinyHttpEngine`]
///
/// Nothing is bound until [`EngineHandle::start`]. Dropping the host closes
/// every socket it holds.
pub struct TinyHttpHost {
    dispatcher: Arc<dyn Dispatcher>,
    config: HostConfig,
    uris: Vec<ListenUri>,
    listeners: Vec<Listener>,
}

impl TinyHttpHost {
    /// Create an unstarted host
    #[must_use]
    pub fn new(dispatcher: Arc<dyn Dispatcher>, config: HostConfig, uris: Vec<ListenUri>) -> Self {
        Self {
            dispatcher,
            config,
            uris,
            listeners: Vec::new(),
        }
    }

    /// True while at least one socket is bound
    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Addresses actually bound, in URI order (resolves port `0`)
    #[must_use]
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners
            .iter()
            .filter_map(|listener| listener.server.server_addr().to_ip())
            .collect()
    }

    fn bind_groups(&self) -> Result<Vec<(String, Vec<Mount>)>, EngineError> {
        let mut groups: Vec<(String, Vec<Mount>)> = Vec::new();

        for uri in &self.uris {
            let address = bind_address(uri, &self.config)?;
            let mount = Mount {
                base_uri: uri.to_string(),
                base_path: uri.path().to_string(),
            };

            if let Some(index) = groups.iter().position(|(existing, _)| *existing == address) {
                groups[index].1.push(mount);
            } else {
                groups.push((address, vec![mount]));
            }
        }

        Ok(groups)
    }

    fn listen(&mut self, address: String, mounts: Vec<Mount>) -> Result<(), EngineError> {
        let server = Server::http(address.as_str()).map_err(|source| EngineError::Bind {
            address: address.clone(),
            source,
        })?;
        info!("listening on {address}");

        let mut listener = Listener {
            address,
            server: Arc::new(server),
            stopping: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
        };
        let mounts = Arc::new(mounts);
        let config = self.config;
        let mut spawn_error = None;

        for n in 0..self.config.worker_count() {
            let server = Arc::clone(&listener.server);
            let stopping = Arc::clone(&listener.stopping);
            let mounts = Arc::clone(&mounts);
            let dispatcher = Arc::clone(&self.dispatcher);

            let spawned = thread::Builder::new()
                .name(format!("nancy-pack-worker-{n}"))
                .spawn(move || {
                    serve(&server, &stopping, &mounts, dispatcher.as_ref(), config);
                });

            match spawned {
                Ok(worker) => listener.workers.push(worker),
                Err(err) => {
                    spawn_error = Some(EngineError::Other(format!(
                        "failed to spawn worker for {}: {err}",
                        listener.address
                    )));
                    break;
                },
            }
        }

        self.listeners.push(listener);
        spawn_error.map_or(Ok(()), Err)
    }

    fn shutdown(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.shutdown();
        }
    }
}

impl EngineHandle for TinyHttpHost {
    fn start(&mut self) -> Result<(), EngineError> {
        if self.is_listening() {
            return Ok(());
        }

        let groups = self.bind_groups()?;
        for (address, mounts) in groups {
            if let Err(err) = self.listen(address, mounts) {
                self.shutdown();
                return Err(err);
            }
        }

        Ok(())
    }

    fn stop(&mut self) {
        self.shutdown();
    }

    fn dispose(mut self) {
        self.shutdown();
    }
}

impl Drop for TinyHttpHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for TinyHttpHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addresses: Vec<&str> = self.listeners.iter().map(|l| l.address.as_str()).collect();
        f.debug_struct("TinyHttpHost")
            .field("config", &self.config)
            .field("uris", &self.uris)
            .field("listening_on", &addresses)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ADDRESSING
// =============================================================================

/// Socket address a listen URI binds to
fn bind_address(uri: &ListenUri, config: &HostConfig) -> Result<String, EngineError> {
    if uri.scheme() != "http" {
        return Err(EngineError::UnsupportedScheme {
            scheme: uri.scheme().to_string(),
            uri: uri.to_string(),
        });
    }

    let host = uri
        .host_str()
        .ok_or_else(|| EngineError::MissingHost(uri.to_string()))?;
    let port = uri.port().unwrap_or(80);

    let host = match host {
        "localhost" if config.rewrite_localhost => "0.0.0.0",
        "+" | "*" => "0.0.0.0",
        other => other,
    };

    Ok(format!("{host}:{port}"))
}

/// Match a request target against the mounted prefixes
///
/// The longest matching prefix wins. A path equal to a prefix without its
/// trailing slash still matches it.
fn route(target: &str, mounts: &[Mount]) -> Option<DispatchRequest> {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (target, None),
    };

    let mount = mounts
        .iter()
        .filter(|m| is_under_prefix(path, &m.base_path))
        .max_by_key(|m| m.base_path.len())?;
    let relative = path.get(mount.base_path.len()..).unwrap_or("");

    Some(DispatchRequest {
        base_uri: mount.base_uri.clone(),
        path: format!("/{relative}"),
        query,
        ..DispatchRequest::default()
    })
}

fn is_under_prefix(path: &str, base_path: &str) -> bool {
    path.starts_with(base_path) || base_path.strip_suffix('/').is_some_and(|base| path == base)
}

// =============================================================================
// REQUEST HANDLING
// =============================================================================

fn serve(
    server: &Server,
    stopping: &AtomicBool,
    mounts: &[Mount],
    dispatcher: &dyn Dispatcher,
    config: HostConfig,
) {
    while !stopping.load(Ordering::SeqCst) {
        match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(mut request)) => {
                let response = respond_to(&mut request, mounts, dispatcher, config.max_body_bytes);
                let response = into_response(response, config.allow_chunked_encoding);
                if let Err(err) = request.respond(response) {
                    debug!("failed to send response: {err}");
                }
            },
            Ok(None) => {},
            Err(err) => {
                if !stopping.load(Ordering::SeqCst) {
                    warn!("failed to receive request: {err}");
                }
            },
        }
    }
}

fn respond_to(
    request: &mut Request,
    mounts: &[Mount],
    dispatcher: &dyn Dispatcher,
    max_body_bytes: u64,
) -> DispatchResponse {
    let Some(mut incoming) = route(request.url(), mounts) else {
        return DispatchResponse::not_found();
    };

    incoming.method = request.method().to_string();
    incoming.headers = request
        .headers()
        .iter()
        .map(|h| (h.field.to_string(), h.value.to_string()))
        .collect();
    incoming.remote_addr = request.remote_addr().copied();

    if request.body_length().is_some_and(|len| exceeds(len, max_body_bytes)) {
        return payload_too_large(max_body_bytes);
    }

    let mut body = request.as_reader().take(max_body_bytes.saturating_add(1));
    if let Err(err) = body.read_to_end(&mut incoming.body) {
        return DispatchResponse::text(400, format!("Failed to read request body: {err}"));
    }
    if exceeds(incoming.body.len(), max_body_bytes) {
        return payload_too_large(max_body_bytes);
    }

    match panic::catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(&incoming))) {
        Ok(response) => response,
        Err(_) => {
            error!("dispatcher panicked on {} {}", incoming.method, incoming.path);
            DispatchResponse::internal_error()
        },
    }
}

fn exceeds(len: usize, max_body_bytes: u64) -> bool {
    !u64::try_from(len).is_ok_and(|len| len <= max_body_bytes)
}

fn payload_too_large(max_body_bytes: u64) -> DispatchResponse {
    DispatchResponse::text(413, format!("Request body exceeds {max_body_bytes} bytes"))
}

fn into_response(response: DispatchResponse, allow_chunked: bool) -> Response<Cursor<Vec<u8>>> {
    let mut out = Response::from_data(response.body).with_status_code(StatusCode(response.status));

    for (name, value) in &response.headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => out.add_header(header),
            Err(()) => warn!("dropping invalid response header '{name}'"),
        }
    }

    if allow_chunked { out } else { out.with_chunked_threshold(usize::MAX) }
}
