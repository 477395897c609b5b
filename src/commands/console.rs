//! Console command
//!
//! Runs a script session on stdin/stdout.

use std::io;
use std::path::Path;
use std::sync::Arc;

use log::info;

use nancy_pack::adapters::{EchoDispatcher, TinyHttpEngine};
use nancy_pack::config::PackConfig;
use nancy_pack::core::services::HostController;
use nancy_pack::script::ScriptSession;

/// Drive the host with line commands read from stdin
pub fn console(config_path: Option<&Path>) -> anyhow::Result<()> {
    let (config, source) = PackConfig::discover(config_path)?;
    info!("using config from {source}");

    let mut host = HostController::new(TinyHttpEngine);
    config.apply(&mut host)?;
    host.set_dispatcher(Arc::new(EchoDispatcher))?;

    let mut session = ScriptSession::new(host);
    let mut stdout = io::stdout();
    session.run(io::stdin().lock(), &mut stdout)?;

    Ok(())
}
