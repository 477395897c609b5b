//! Business logic services
//!
//! - [`controller`] - Start/stop/reconfigure state machine around one engine

pub mod controller;

pub use controller::{HostController, HostError, Reconfigure};
