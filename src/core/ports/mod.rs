//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundary between the controller and the
//! collaborators it drives: the HTTP engine and the request dispatcher.
//!
//! Implementations live in the `adapters` module.

mod dispatcher;
mod engine;

pub use dispatcher::{DispatchRequest, DispatchResponse, Dispatcher};
pub use engine::{EngineError, EngineHandle, HostEngine};
