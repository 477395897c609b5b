//! Built-in dispatchers

use crate::core::ports::{DispatchRequest, DispatchResponse, Dispatcher};

/// Answers every request with a JSON description of it
///
/// Used by the CLI so a freshly started host has something to serve.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoDispatcher;

impl Dispatcher for EchoDispatcher {
    fn dispatch(&self, request: &DispatchRequest) -> DispatchResponse {
        DispatchResponse::json(
            200,
            &serde_json::json!({
                "method": request.method,
                "base_uri": request.base_uri,
                "path": request.path,
                "query": request.query,
                "body_bytes": request.body.len(),
                "server": format!("nancy-pack/{}", crate::VERSION),
            }),
        )
    }
}
