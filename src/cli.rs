//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands;
use nancy_pack::output::OutputMode;

/// nancy-pack - Embed and control a self-hosted web application
#[derive(Parser, Debug)]
#[command(
    name = "nancy-pack",
    version,
    about = "Embed and control a self-hosted web application",
    long_about = "Start, stop and reconfigure an embedded HTTP host.\n\n\
                  Listen URIs must be absolute and end in '/'.\n\
                  Changing configuration while running restarts the host unless it is waiting."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start hosting and block until Enter is pressed
    Serve {
        /// Listen URI (repeatable); overrides the config file
        #[arg(short, long = "uri")]
        uris: Vec<String>,

        /// Pack config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Drive the host with line commands read from stdin
    Console {
        /// Pack config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate listen URIs
    CheckUris {
        /// URIs to validate
        #[arg(required = true)]
        uris: Vec<String>,
    },

    /// Show or create the pack config
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective config and where it came from
    Show {
        /// Pack config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default nancy-pack.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match cli.command {
        Some(Command::Serve { uris, config }) => commands::serve(&uris, config.as_deref(), output_mode),
        Some(Command::Console { config }) => commands::console(config.as_deref()),
        Some(Command::CheckUris { uris }) => commands::check_uris(&uris, output_mode),
        Some(Command::Config { action }) => commands::config_cmd(action, output_mode),
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION")
                    })
                );
            } else {
                println!("nancy-pack v{}", env!("CARGO_PKG_VERSION"));
            }
            Ok(())
        },
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("nancy-pack v{}", env!("CARGO_PKG_VERSION"));
                println!("\nRun 'nancy-pack --help' for usage");
                println!("Run 'nancy-pack serve' to start hosting");
            }
            Ok(())
        },
    }
}
