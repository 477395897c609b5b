//! Command implementations

mod check_uris;
mod config_cmd;
mod console;
mod serve;

pub use check_uris::check_uris;
pub use config_cmd::config_cmd;
pub use console::console;
pub use serve::serve;
