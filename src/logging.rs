//! Tracing setup shared by both binaries.

use tracing_subscriber::EnvFilter;

/// Log level derived from the number of `-v` flags.
///
/// - `0` → `info`
/// - `1` → `debug`
/// - `2+` → `trace`
pub fn level_for(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// Install the global subscriber. Per-target `RUST_LOG` directives are combined
/// with the verbosity default. Logs go to stderr; stdout is reserved for JSON.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::from_default_env().add_directive(level_for(verbosity).into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
