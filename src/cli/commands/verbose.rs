//! cli::commands::verbose
//!
//! `--verbose`: print the parsed arguments that carry a value, one
//! `name value` pair per line. Unset options and `false` flags are left
//! out. Multi-valued options print one line per value.

use std::io::{self, Write};

use clap::{ArgMatches, Command};

/// Dump the arguments of `matches`, in the order `cmd` declares them.
pub fn verbose(cmd: &Command, matches: &ArgMatches, out: &mut impl Write) -> io::Result<()> {
    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_str();
        if id == "help" || id == "version" {
            continue;
        }
        let Some(values) = matches.try_get_raw(id).ok().flatten() else {
            continue;
        };
        let name = arg.get_long().unwrap_or(id);
        for value in values {
            let value = value.to_string_lossy();
            if value == "false" {
                continue;
            }
            writeln!(out, "{} {}", name, value)?;
        }
    }
    Ok(())
}
