//! Tracing setup for the CLI.
//!
//! The library crates log through the `log` facade; `tracing-subscriber`
//! installs a `log` bridge on `init`, so their records end up here too.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` still wins over the default level picked by `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
