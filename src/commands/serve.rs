//! Serve command
//!
//! Starts the host with the echo dispatcher and keeps it running until a
//! line (or end of input) arrives on stdin.

use std::io;
use std::path::Path;
use std::sync::Arc;

use log::info;

use nancy_pack::adapters::{EchoDispatcher, TinyHttpEngine};
use nancy_pack::config::PackConfig;
use nancy_pack::core::services::HostController;
use nancy_pack::output::{HostStatus, OutputMode};

/// Start hosting and block until Enter is pressed
pub fn serve(uris: &[String], config_path: Option<&Path>, mode: OutputMode) -> anyhow::Result<()> {
    let (config, source) = PackConfig::discover(config_path)?;
    info!("using config from {source}");

    // Status lines would corrupt JSON output
    let mut host = match mode {
        OutputMode::Human => HostController::new(TinyHttpEngine),
        OutputMode::Json => HostController::with_output(TinyHttpEngine, io::sink()),
    };

    host.wait();
    config.apply(&mut host)?;
    if !uris.is_empty() {
        host.set_listen_uris(uris)?;
    }
    host.set_dispatcher(Arc::new(EchoDispatcher))?;
    host.start()?;

    let status = HostStatus {
        started: host.is_started(),
        waiting: host.is_waiting(),
        uris: host.listen_uris().iter().map(ToString::to_string).collect(),
        bound: host
            .handle()
            .map(|h| h.local_addrs().iter().map(ToString::to_string).collect())
            .unwrap_or_default(),
    };
    status.render(mode);

    if mode == OutputMode::Human {
        println!("Press Enter to stop");
    }

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    host.release();
    Ok(())
}
