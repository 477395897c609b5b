//! Core domain logic for nancy-pack
//!
//! This module contains the host lifecycle logic with no direct I/O.
//! The HTTP engine and the request dispatcher are reached through port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (`ListenUri`, `HostConfig`)
//! - `services/` - The `HostController` state machine
//! - `ports/` - Trait definitions for the engine and dispatcher

pub mod models;
pub mod ports;
pub mod services;
