//! Config command

use std::path::Path;

use nancy_pack::config::PackConfig;
use nancy_pack::core::models::HostConfig;
use nancy_pack::output::{ConfigShowResult, OperationResult, OutputMode};
use nancy_pack::paths;

use crate::cli::ConfigAction;

/// Handle config subcommands
pub fn config_cmd(action: ConfigAction, mode: OutputMode) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show { config } => show(config.as_deref(), mode),
        ConfigAction::Init { force } => init(force, mode),
    }
}

fn show(config_path: Option<&Path>, mode: OutputMode) -> anyhow::Result<()> {
    let (config, source) = PackConfig::discover(config_path)?;

    ConfigShowResult {
        source: source.to_string(),
        config,
    }
    .render(mode);

    Ok(())
}

fn init(force: bool, mode: OutputMode) -> anyhow::Result<()> {
    let path = paths::local_config();

    if path.exists() && !force {
        OperationResult {
            success: false,
            message: format!("{} already exists. Use --force to overwrite.", path.display()),
        }
        .render(mode);
        return Ok(());
    }

    let config = PackConfig {
        host: Some(HostConfig::default()),
        ..PackConfig::default()
    };
    config.save(&path)?;

    OperationResult {
        success: true,
        message: format!("Created {}", path.display()),
    }
    .render(mode);

    Ok(())
}
