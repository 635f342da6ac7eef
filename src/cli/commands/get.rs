//! cli::commands::get
//!
//! `--get`, `--get_verbatim` and `--get_fragment`: one occurrence by key.

use super::{CommandError, Invocation};
use crate::cli::args::Cli;
use crate::core::config::Credentials;

const KEY_REQUIRED: &str = "--gKey argument is required";

fn key(cli: &Cli) -> Result<u64, CommandError> {
    cli.get.key.ok_or(CommandError::MissingArgument(KEY_REQUIRED))
}

pub(super) fn build(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    key(cli).map(Invocation::Get)
}

pub(super) fn build_verbatim(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    key(cli).map(Invocation::GetVerbatim)
}

pub(super) fn build_fragment(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    key(cli).map(Invocation::GetFragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::Builder;
    use clap::Parser;

    #[test]
    fn all_three_need_a_key() {
        let cli = Cli::parse_from(["gbif", "-g"]);
        let creds = Credentials::default();
        let builders: [Builder; 3] = [build, build_verbatim, build_fragment];
        for build in builders {
            let err = build(&cli, &creds).unwrap_err();
            assert_eq!(err.to_string(), KEY_REQUIRED);
        }
    }

    #[test]
    fn key_selects_the_record() {
        let cli = Cli::parse_from(["gbif", "--get_fragment", "--gKey", "1052909293"]);
        let creds = Credentials::default();
        assert_eq!(build(&cli, &creds).unwrap(), Invocation::Get(1052909293));
        assert_eq!(
            build_fragment(&cli, &creds).unwrap(),
            Invocation::GetFragment(1052909293)
        );
    }
}
