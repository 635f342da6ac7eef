//! cli::commands::download
//!
//! The `--download` family.
//!
//! `--download` and `--download_list` are authenticated. Their credentials
//! come from `GBIF_USER`, `GBIF_PWD` and `GBIF_EMAIL`, resolved only once
//! the companion arguments are known to be present, so a missing `--queries`
//! is reported before a missing variable.

use std::path::PathBuf;

use super::{CommandError, Invocation};
use crate::backend::{is_download_key, DownloadRequest};
use crate::cli::args::Cli;
use crate::core::config::{Credentials, GBIF_EMAIL};

/// Page size of `--download_list` when `--limit` is not given.
pub const DEFAULT_LIST_LIMIT: u32 = 20;

const KEY_REQUIRED: &str = "--dKey argument is required";

pub(super) fn build(cli: &Cli, credentials: &Credentials) -> Result<Invocation, CommandError> {
    let args = &cli.download;
    if args.queries.is_empty() {
        return Err(CommandError::MissingArgument(
            "queries arguments are required",
        ));
    }

    let auth = credentials.basic_auth()?;
    let email = credentials.require(GBIF_EMAIL)?;
    let request = DownloadRequest::new(&args.queries, args.q_type, args.format, auth, email)?;
    Ok(Invocation::Download(request))
}

/// The `--dKey` value, once it is known to be a well-formed download key.
fn download_key(cli: &Cli, missing: &'static str) -> Result<String, CommandError> {
    let key = cli
        .download
        .key
        .as_deref()
        .ok_or(CommandError::MissingArgument(missing))?;
    if !is_download_key(key) {
        return Err(CommandError::InvalidKey(key.to_string()));
    }
    Ok(key.to_string())
}

pub(super) fn build_meta(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    download_key(cli, KEY_REQUIRED).map(Invocation::DownloadMeta)
}

pub(super) fn build_list(cli: &Cli, credentials: &Credentials) -> Result<Invocation, CommandError> {
    Ok(Invocation::DownloadList {
        auth: credentials.basic_auth()?,
        limit: cli.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        offset: cli.offset.unwrap_or(0),
    })
}

pub(super) fn build_get(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    let key = download_key(cli, "--dKey argument is required [--path]")?;
    let dir = cli
        .download
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Invocation::DownloadGet { key, dir })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BasicAuth, DownloadFormat, QueryError};
    use crate::core::config::ConfigError;
    use clap::Parser;
    use serde_json::json;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    fn full() -> Credentials {
        Credentials::new(
            Some("someone".into()),
            Some("secret".into()),
            Some("someone@example.org".into()),
        )
    }

    #[test]
    fn missing_queries_comes_before_credentials() {
        let err = build(&cli(&["gbif", "-d"]), &Credentials::default()).unwrap_err();
        assert_eq!(err.to_string(), "queries arguments are required");
        assert!(err.is_usage());
    }

    #[test]
    fn missing_credentials_name_the_variable() {
        let args = cli(&["gbif", "-d", "-q", "country = PT"]);

        let err = build(&args, &Credentials::default()).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Config(ConfigError::MissingCredential("GBIF_USER"))
        ));

        let no_pwd = Credentials::new(Some("u".into()), None, Some("e@x".into()));
        assert!(build(&args, &no_pwd).unwrap_err().to_string().contains("GBIF_PWD"));

        let no_email = Credentials::new(Some("u".into()), Some("p".into()), None);
        let err = build(&args, &no_email).unwrap_err();
        assert!(!err.is_usage());
        assert!(err.to_string().contains("GBIF_EMAIL"));
    }

    #[test]
    fn download_builds_the_predicate() {
        let args = cli(&["gbif", "-d", "-q", "taxonKey = 2435099", "year >= 2000"]);
        let Invocation::Download(request) = build(&args, &full()).unwrap() else {
            panic!("expected a download invocation");
        };
        assert_eq!(request.auth.user, "someone");
        assert_eq!(request.email, "someone@example.org");
        assert_eq!(request.format, DownloadFormat::SimpleCsv);
        assert_eq!(
            request.predicate,
            json!({
                "type": "and",
                "predicates": [
                    {"type": "equals", "key": "TAXON_KEY", "value": "2435099"},
                    {"type": "greaterThanOrEquals", "key": "YEAR", "value": "2000"}
                ]
            })
        );
    }

    #[test]
    fn malformed_query_is_a_usage_error() {
        let args = cli(&["gbif", "-d", "-q", "country"]);
        let err = build(&args, &full()).unwrap_err();
        assert!(err.is_usage());
        assert!(matches!(
            err,
            CommandError::InvalidQuery(QueryError::Malformed(_))
        ));
    }

    #[test]
    fn meta_and_get_need_a_key() {
        let creds = Credentials::default();
        let bare = cli(&["gbif"]);
        assert_eq!(
            build_meta(&bare, &creds).unwrap_err().to_string(),
            "--dKey argument is required"
        );
        assert_eq!(
            build_get(&bare, &creds).unwrap_err().to_string(),
            "--dKey argument is required [--path]"
        );
    }

    #[test]
    fn keys_that_leave_the_target_are_rejected() {
        let creds = Credentials::default();
        for key in ["../escaped", "a/b", "a\\b", ".."] {
            let args = cli(&["gbif", "--dKey", key, "--path", "/tmp/gbif"]);
            let err = build_get(&args, &creds).unwrap_err();
            assert!(err.is_usage());
            assert!(matches!(err, CommandError::InvalidKey(ref k) if k == key));
            assert!(matches!(
                build_meta(&args, &creds),
                Err(CommandError::InvalidKey(_))
            ));
        }
        assert_eq!(
            build_get(&cli(&["gbif", "--dKey", "../escaped"]), &creds)
                .unwrap_err()
                .to_string(),
            "--dKey '../escaped' is not a valid download key"
        );
    }

    #[test]
    fn get_defaults_to_current_directory() {
        let creds = Credentials::default();
        let key = "0000066-140928181241064";
        assert_eq!(
            build_get(&cli(&["gbif", "--dKey", key]), &creds).unwrap(),
            Invocation::DownloadGet {
                key: key.into(),
                dir: PathBuf::from(".")
            }
        );
        assert_eq!(
            build_get(&cli(&["gbif", "--dKey", key, "--path", "/tmp/gbif"]), &creds).unwrap(),
            Invocation::DownloadGet {
                key: key.into(),
                dir: PathBuf::from("/tmp/gbif")
            }
        );
    }

    #[test]
    fn list_paging_defaults() {
        let invocation = build_list(&cli(&["gbif", "--download_list"]), &full()).unwrap();
        assert_eq!(
            invocation,
            Invocation::DownloadList {
                auth: BasicAuth {
                    user: "someone".into(),
                    password: "secret".into()
                },
                limit: DEFAULT_LIST_LIMIT,
                offset: 0
            }
        );
    }

    #[test]
    fn list_needs_user_and_password_only() {
        let creds = Credentials::new(Some("u".into()), Some("p".into()), None);
        assert!(build_list(&cli(&["gbif", "--download_list"]), &creds).is_ok());
        let err = build_list(&cli(&["gbif", "--download_list"]), &Credentials::default())
            .unwrap_err();
        assert!(err.to_string().contains("GBIF_USER"));
    }
}
