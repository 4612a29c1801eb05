//! Tracing setup.
//!
//! Logs go to stderr: the command-line tools print their encoded result on
//! stdout and nothing else may be written there.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. An invalid `filter` falls back to `info`;
/// a second call is a no-op.
pub fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .try_init();
}
