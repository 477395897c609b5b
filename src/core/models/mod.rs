//! Domain models for nancy-pack
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`ListenUri`] - A validated listen prefix
//! - [`HostConfig`] - Options passed through to the engine

mod host_config;
mod listen_uri;

pub use host_config::{DEFAULT_MAX_BODY_BYTES, HostConfig};
pub use listen_uri::{DEFAULT_URI, ListenUri, UriError};
