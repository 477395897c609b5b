//! Line-oriented script console
//!
//! `ScriptSession` drives a [`HostController`] from text commands, one per
//! line, the way a scripting host embeds the pack:
//!
//! ```text
//! wait
//! uris http://localhost:8080/ http://localhost:8080/api/
//! config host.toml
//! start
//! status
//! stop
//! ```
//!
//! When the input ends the controller is stopped.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use crate::config::{self, ConfigError};
use crate::core::models::HostConfig;
use crate::core::ports::HostEngine;
use crate::core::services::{HostController, HostError};

const HELP: &str = "\
commands:
  start | go              start (or restart) the host
  stop                    stop the host
  wait                    hold restarts until the next start
  status                  show the host state
  uris [URI...]           replace the listen URIs (none = empty set)
  config default|none|PATH
                          set the host config (PATH: host table or pack file)
  help                    show this help
  quit | exit             end the session";

/// Errors raised by a single script command
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The command word is not known
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    /// The command was given the wrong arguments
    #[error("usage: {0}")]
    Usage(&'static str),

    /// The controller rejected the command
    #[error(transparent)]
    Host(#[from] HostError),

    /// A config file could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Whether the session should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// End the session
    Quit,
}

/// A parsed script command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// `start` / `go`
    Start,
    /// `stop`
    Stop,
    /// `wait`
    Wait,
    /// `status`
    Status,
    /// `uris [URI...]`
    Uris(Vec<String>),
    /// `config default`
    ConfigDefault,
    /// `config none`
    ConfigNone,
    /// `config PATH`
    ConfigFile(PathBuf),
    /// `help`
    Help,
    /// `quit` / `exit`
    Quit,
}

impl ScriptCommand {
    /// Parse one line; `Ok(None)` for blank lines and `#` comments
    pub fn parse(line: &str) -> Result<Option<Self>, ScriptError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (word.to_lowercase().as_str(), args.as_slice()) {
            ("start" | "go", []) => Self::Start,
            ("stop", []) => Self::Stop,
            ("wait", []) => Self::Wait,
            ("status", []) => Self::Status,
            ("help", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            ("uris", uris) => Self::Uris(uris.iter().map(ToString::to_string).collect()),
            ("config", ["default"]) => Self::ConfigDefault,
            ("config", ["none"]) => Self::ConfigNone,
            ("config", [path]) => Self::ConfigFile(PathBuf::from(path)),
            ("config", _) => return Err(ScriptError::Usage("config default|none|PATH")),
            ("start" | "go" | "stop" | "wait" | "status" | "help" | "quit" | "exit", _) => {
                return Err(ScriptError::Usage("this command takes no arguments"));
            },
            _ => return Err(ScriptError::UnknownCommand(word.to_string())),
        };

        Ok(Some(command))
    }
}

/// Drives one controller from script commands
#[derive(Debug)]
pub struct ScriptSession<E: HostEngine> {
    controller: HostController<E>,
}

impl<E: HostEngine> ScriptSession<E> {
    /// Wrap a controller
    #[must_use]
    pub const fn new(controller: HostController<E>) -> Self {
        Self { controller }
    }

    /// The controller being driven
    #[must_use]
    pub const fn controller(&self) -> &HostController<E> {
        &self.controller
    }

    /// Unwrap the controller
    #[must_use]
    pub fn into_controller(self) -> HostController<E> {
        self.controller
    }

    /// Parse and run one line, writing any reply to `out`
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow, ScriptError> {
        let Some(command) = ScriptCommand::parse(line)? else {
            return Ok(Flow::Continue);
        };
        debug!("script command: {command:?}");

        match command {
            ScriptCommand::Start => {
                self.controller.start()?;
            },
            ScriptCommand::Stop => {
                self.controller.stop();
            },
            ScriptCommand::Wait => {
                self.controller.wait();
            },
            ScriptCommand::Status => self.write_status(out),
            ScriptCommand::Uris(uris) => {
                self.controller.set_listen_uris(&uris)?;
            },
            ScriptCommand::ConfigDefault => {
                self.controller.set_host_config(Some(HostConfig::default()))?;
            },
            ScriptCommand::ConfigNone => {
                self.controller.set_host_config(None)?;
            },
            ScriptCommand::ConfigFile(path) => {
                let host_config = config::load_host_config(&path)?;
                self.controller.set_host_config(host_config)?;
            },
            ScriptCommand::Help => reply(out, HELP),
            ScriptCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// Run commands until `quit` or end of input, then stop the host
    ///
    /// Command errors are written to `out` and do not end the session.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            match self.execute(&line, out) {
                Ok(Flow::Continue) => {},
                Ok(Flow::Quit) => break,
                Err(err) => writeln!(out, "error: {err}")?,
            }
            out.flush()?;
        }

        self.controller.stop();
        Ok(())
    }

    fn write_status<W: Write>(&self, out: &mut W) {
        let uris: Vec<&str> = self.controller.listen_uris().iter().map(|u| u.as_str()).collect();
        let uris = if uris.is_empty() {
            "(none)".to_string()
        } else {
            uris.join(" ")
        };
        let config = if self.controller.host_config().is_some() {
            "custom"
        } else {
            "engine default"
        };

        reply(
            out,
            &format!(
                "started: {}\nwaiting: {}\nuris: {uris}\nconfig: {config}",
                yes_no(self.controller.is_started()),
                yes_no(self.controller.is_waiting()),
            ),
        );
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn reply<W: Write>(out: &mut W, text: &str) {
    if let Err(err) = writeln!(out, "{text}") {
        debug!("failed to write script reply: {err}");
    }
}
