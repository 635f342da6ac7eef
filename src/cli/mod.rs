//! cli
//!
//! Command-line interface layer for gbif.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load settings and credentials once, at startup
//! - Delegate to the dispatch table in [`commands`]
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, handles the
//! invocations that never reach GBIF (`--completions`, `--verbose`), and
//! hands everything else to [`commands::dispatch`] on a current-thread
//! tokio runtime.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::CommandFactory;

use crate::backend::http::GbifClient;
use crate::core::config::{Credentials, Settings};
use crate::ui::{self, output::JsonStyle};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. Startup failures
/// (unreadable settings, a client that cannot be built) come back as
/// errors; everything after that is reported through the exit code.
pub fn run() -> Result<ExitCode> {
    run_with_args(std::env::args_os())
}

/// Run with an explicit argument vector, program name first.
pub fn run_with_args<I, T>(args: I) -> Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.len() <= 1 {
        Cli::command().write_help(&mut out)?;
        writeln!(out)?;
        return Ok(ExitCode::SUCCESS);
    }

    let (cli, matches) = match Cli::try_parse_with_matches(args) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };

    ui::logging::init(cli.debug);
    tracing::debug!(commands = ?commands::selected(&cli), "parsed arguments");

    if let Some(shell) = cli.completions {
        commands::completion(shell, &mut out);
        return Ok(ExitCode::SUCCESS);
    }

    if cli.verbose {
        commands::verbose(&Cli::command(), &matches, &mut out)?;
        return Ok(ExitCode::SUCCESS);
    }

    let loaded = Settings::load(cli.config.as_deref())?;
    if loaded.path.is_none() {
        tracing::debug!("no settings file, using defaults");
    }
    let settings = loaded.settings;

    let ctx = commands::Context {
        credentials: Credentials::from_env(),
        style: JsonStyle {
            pretty: cli.json || settings.pretty(),
            sort_keys: cli.sort_keys || settings.sort_keys(),
        },
    };

    let client = GbifClient::with_api_base(settings.api_base(), settings.timeout())
        .context("failed to build the HTTP client")?;
    tracing::debug!(api_base = client.api_base(), "GBIF client ready");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let stderr = io::stderr();
    let mut err = stderr.lock();
    let outcome = runtime.block_on(commands::dispatch(&cli, &ctx, &client, &mut out, &mut err));
    out.flush()?;

    Ok(outcome.exit_code())
}
