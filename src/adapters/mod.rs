//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - `tiny_http` - HTTP engine built on `tiny_http`
//! - `dispatch` - Built-in dispatchers

pub mod dispatch;
pub mod tiny_http;

pub use dispatch::EchoDispatcher;
pub use self::tiny_http::{TinyHttpEngine, TinyHttpHost};
