//! Tracing subscriber setup for the `scopekit` binary

use tracing_subscriber::EnvFilter;

/// Install a global subscriber writing to stderr
///
/// The filter comes from `RUST_LOG` and defaults to `info`. With `json` set,
/// events are emitted as JSON lines.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
    }
}
