//! # Diagnostics setup.
//!
//! The runtime reports its own diagnostics through `tracing`. Standard output
//! belongs to the serializer, so [`init_logging`] writes to stderr.
//!
//! The filter comes from `JOBVISOR_LOG` (e.g. `JOBVISOR_LOG=jobvisor=debug`)
//! and defaults to `warn`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "JOBVISOR_LOG";

/// Installs a stderr `tracing` subscriber.
///
/// Returns `Err` if a global subscriber is already set.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
