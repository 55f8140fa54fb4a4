// Logging setup for the command-line tools

use tracing_subscriber::EnvFilter;

/// Install a compact stderr subscriber filtered by `RUST_LOG`.
///
/// Falls back to `default_directive` (e.g. `"info"`) when `RUST_LOG` is unset
/// or invalid. Returns `false` if a global subscriber was already installed.
/// Records emitted through the `log` facade are forwarded as well.
pub fn init_logging(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok()
}
