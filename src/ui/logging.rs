//! ui::logging
//!
//! `tracing` subscriber setup for the binary.
//!
//! Logs go to stderr. The default level is `warn`; `--debug` raises it to
//! `debug`. `RUST_LOG`, when set, overrides both.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default level for the given `--debug` flag.
pub fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(debug: bool) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level(debug).into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(debug),
        )
        .with(env_filter)
        .try_init();
}
