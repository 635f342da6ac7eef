//! cli::commands
//!
//! Command dispatch.
//!
//! # Architecture
//!
//! Every command is one entry in [`COMMANDS`]: its name, a predicate that
//! reads its presence flag, and a builder that validates companions and
//! credentials and yields an [`Invocation`]. The builder never touches the
//! network, so a missing companion can never cause a backend call.
//!
//! [`dispatch`] walks the table in order and, for each selected command:
//!
//! 1. Builds the invocation. A usage error prints a one-line message to
//!    stdout and moves on to the next command. A configuration error (a
//!    missing credential) stops the run with exit code 1.
//! 2. Executes it against the backend. A failure prints the last line of
//!    its description to stderr and stops the run with exit code 1.
//! 3. Prints the result.

mod completion;
mod count;
mod download;
mod get;
mod search;
mod verbose;

pub use completion::completion;
pub use search::FieldSelection;
pub use verbose::verbose;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use serde_json::Value;
use thiserror::Error;

use crate::backend::{
    BackendError, BasicAuth, CountParams, DownloadRequest, Occurrences, QueryError, SearchParams,
};
use crate::cli::args::Cli;
use crate::core::config::{ConfigError, Credentials};
use crate::ui::output::{self, JsonStyle};

/// Everything a command needs besides the parsed arguments.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub credentials: Credentials,
    pub style: JsonStyle,
}

/// Errors raised while preparing a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A required companion argument is absent.
    #[error("{0}")]
    MissingArgument(&'static str),

    /// A `--queries` value could not be turned into a predicate.
    #[error("{0}")]
    InvalidQuery(#[from] QueryError),

    /// `--dKey` is not shaped like a GBIF download key.
    #[error("--dKey '{0}' is not a valid download key")]
    InvalidKey(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CommandError {
    /// Usage errors abort only the current command.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            CommandError::MissingArgument(_)
                | CommandError::InvalidQuery(_)
                | CommandError::InvalidKey(_)
        )
    }
}

/// A validated backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Search {
        params: SearchParams,
        fields: Option<FieldSelection>,
    },
    Get(u64),
    GetVerbatim(u64),
    GetFragment(u64),
    Count(CountParams),
    CountBasisOfRecord,
    CountYear(String),
    CountDatasets {
        taxon_key: Option<u64>,
        country: Option<String>,
    },
    CountCountries(String),
    CountSchema,
    CountPublishingCountries(String),
    Download(DownloadRequest),
    DownloadMeta(String),
    DownloadList {
        auth: BasicAuth,
        limit: u32,
        offset: u32,
    },
    DownloadGet {
        key: String,
        dir: PathBuf,
    },
}

impl Invocation {
    /// Run the call against `backend`.
    pub async fn execute(&self, backend: &dyn Occurrences) -> Result<Value, BackendError> {
        match self {
            Invocation::Search { params, fields } => {
                let page = backend.search(params).await?;
                Ok(match fields {
                    Some(fields) => fields.apply(page),
                    None => page,
                })
            }
            Invocation::Get(key) => backend.get(*key).await,
            Invocation::GetVerbatim(key) => backend.get_verbatim(*key).await,
            Invocation::GetFragment(key) => backend.get_fragment(*key).await,
            Invocation::Count(params) => backend.count(params).await,
            Invocation::CountBasisOfRecord => backend.count_basisofrecord().await,
            Invocation::CountYear(year) => backend.count_year(year).await,
            Invocation::CountDatasets { taxon_key, country } => {
                backend.count_datasets(*taxon_key, country.as_deref()).await
            }
            Invocation::CountCountries(publishing_country) => {
                backend.count_countries(publishing_country).await
            }
            Invocation::CountSchema => backend.count_schema().await,
            Invocation::CountPublishingCountries(country) => {
                backend.count_publishingcountries(country).await
            }
            Invocation::Download(request) => backend.download(request).await,
            Invocation::DownloadMeta(key) => backend.download_meta(key).await,
            Invocation::DownloadList {
                auth,
                limit,
                offset,
            } => backend.download_list(auth, *limit, *offset).await,
            Invocation::DownloadGet { key, dir } => backend.download_get(key, dir).await,
        }
    }
}

/// Builds an [`Invocation`] from the parsed arguments.
pub type Builder = fn(&Cli, &Credentials) -> Result<Invocation, CommandError>;

/// One row of the dispatch table.
pub struct CommandEntry {
    pub name: &'static str,
    pub is_selected: fn(&Cli) -> bool,
    pub build: Builder,
}

/// All commands, in the order they run when several are selected.
pub const COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        name: "search",
        is_selected: |cli: &Cli| cli.search.search,
        build: search::build,
    },
    CommandEntry {
        name: "get",
        is_selected: |cli: &Cli| cli.get.get,
        build: get::build,
    },
    CommandEntry {
        name: "get_verbatim",
        is_selected: |cli: &Cli| cli.get.get_verbatim,
        build: get::build_verbatim,
    },
    CommandEntry {
        name: "get_fragment",
        is_selected: |cli: &Cli| cli.get.get_fragment,
        build: get::build_fragment,
    },
    CommandEntry {
        name: "count",
        is_selected: |cli: &Cli| cli.count.count,
        build: count::build,
    },
    CommandEntry {
        name: "count_basisofrecord",
        is_selected: |cli: &Cli| cli.count.count_basisofrecord,
        build: count::build_basisofrecord,
    },
    CommandEntry {
        name: "count_year",
        is_selected: |cli: &Cli| cli.count.count_year,
        build: count::build_year,
    },
    CommandEntry {
        name: "count_datasets",
        is_selected: |cli: &Cli| cli.count.count_datasets,
        build: count::build_datasets,
    },
    CommandEntry {
        name: "count_country",
        is_selected: |cli: &Cli| cli.count.count_country,
        build: count::build_country,
    },
    CommandEntry {
        name: "count_publishingCountry",
        is_selected: |cli: &Cli| cli.count.count_publishing_country,
        build: count::build_publishing_country,
    },
    CommandEntry {
        name: "count_schema",
        is_selected: |cli: &Cli| cli.count.count_schema,
        build: count::build_schema,
    },
    CommandEntry {
        name: "download",
        is_selected: |cli: &Cli| cli.download.download,
        build: download::build,
    },
    CommandEntry {
        name: "download_meta",
        is_selected: |cli: &Cli| cli.download.download_meta,
        build: download::build_meta,
    },
    CommandEntry {
        name: "download_list",
        is_selected: |cli: &Cli| cli.download.download_list,
        build: download::build_list,
    },
    CommandEntry {
        name: "download_get",
        is_selected: |cli: &Cli| cli.download.download_get,
        build: download::build_get,
    },
];

/// Names of the commands selected on the command line, in table order.
pub fn selected(cli: &Cli) -> Vec<&'static str> {
    COMMANDS
        .iter()
        .filter(|entry| (entry.is_selected)(cli))
        .map(|entry| entry.name)
        .collect()
}

/// What happened during a dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Commands whose result was printed.
    pub completed: Vec<&'static str>,
    /// Commands skipped because of a usage error.
    pub skipped: Vec<&'static str>,
    /// The command that ended the run, if any.
    pub failed: Option<&'static str>,
}

impl Outcome {
    pub fn success(&self) -> bool {
        self.failed.is_none()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Run every selected command against `backend`.
///
/// Results and usage messages go to `out`, diagnostics to `err`.
pub async fn dispatch(
    cli: &Cli,
    ctx: &Context,
    backend: &dyn Occurrences,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Outcome {
    let mut outcome = Outcome::default();

    for entry in COMMANDS.iter().filter(|entry| (entry.is_selected)(cli)) {
        let invocation = match (entry.build)(cli, &ctx.credentials) {
            Ok(invocation) => invocation,
            Err(e) if e.is_usage() => {
                tracing::debug!(command = entry.name, "skipping: {}", e);
                output::usage(out, &e);
                outcome.skipped.push(entry.name);
                continue;
            }
            Err(e) => {
                output::error(err, &e);
                outcome.failed = Some(entry.name);
                return outcome;
            }
        };

        tracing::debug!(command = entry.name, backend = backend.name(), "executing");
        let value = match invocation.execute(backend).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(command = entry.name, error = ?e, "backend call failed");
                output::error(err, &e);
                outcome.failed = Some(entry.name);
                return outcome;
            }
        };

        if let Err(e) = output::print_result(out, &value, ctx.style) {
            output::error(err, format!("failed to write result: {}", e));
            outcome.failed = Some(entry.name);
            return outcome;
        }
        outcome.completed.push(entry.name);
    }

    if outcome.completed.is_empty() && outcome.skipped.is_empty() {
        tracing::debug!("no command selected");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn table_names_are_unique() {
        let mut names: Vec<_> = COMMANDS.iter().map(|e| e.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COMMANDS.len());
        assert_eq!(COMMANDS.len(), 15);
    }

    #[test]
    fn selected_follows_table_order() {
        let cli = Cli::parse_from(["gbif", "--count_schema", "-s", "--get"]);
        assert_eq!(selected(&cli), vec!["search", "get", "count_schema"]);
    }

    #[test]
    fn nothing_selected() {
        let cli = Cli::parse_from(["gbif", "--json"]);
        assert!(selected(&cli).is_empty());
    }

    #[test]
    fn usage_classification() {
        assert!(CommandError::MissingArgument("--gKey argument is required").is_usage());
        assert!(CommandError::InvalidQuery(QueryError::Empty).is_usage());
        assert!(!CommandError::Config(ConfigError::MissingCredential("GBIF_USER")).is_usage());
    }

    #[test]
    fn outcome_success() {
        let mut outcome = Outcome::default();
        assert!(outcome.success());
        outcome.failed = Some("get");
        assert!(!outcome.success());
    }
}
