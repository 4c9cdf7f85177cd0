//! Log subscriber setup for the binary.

use tracing::Level;

/// Pick the log level from the settings flag and the CLI `--verbose` switch.
#[must_use]
pub fn level_for(debug: bool, verbose: bool) -> Level {
    if debug || verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install a stderr fmt subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(level: Level) {
    let result = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if result.is_err() {
        tracing::debug!("Log subscriber already installed");
    }
}
