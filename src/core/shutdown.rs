//! # Cross-platform OS termination signals.
//!
//! Provides [`ShutdownSignals`], a set of listeners registered once and awaited
//! repeatedly by the progress supervisor.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal)
//! - `SIGQUIT` (quit signal)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! Once registered, these signals no longer terminate the process by default;
//! delivery is left to the listener.

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Termination signal listeners.
pub(crate) struct ShutdownSignals {
    #[cfg(unix)]
    sigint: Signal,
    #[cfg(unix)]
    sigterm: Signal,
    #[cfg(unix)]
    sigquit: Signal,
}

impl ShutdownSignals {
    /// Registers the listeners.
    ///
    /// Returns `Err` if signal registration fails.
    #[cfg(unix)]
    pub(crate) fn register() -> std::io::Result<Self> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Registers the listeners.
    #[cfg(not(unix))]
    pub(crate) fn register() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Waits for the next termination signal.
    #[cfg(unix)]
    pub(crate) async fn recv(&mut self) {
        tokio::select! {
            Some(()) = self.sigint.recv()  => {},
            Some(()) = self.sigterm.recv() => {},
            Some(()) = self.sigquit.recv() => {},
            else => std::future::pending::<()>().await,
        }
    }

    /// Waits for the next termination signal.
    #[cfg(not(unix))]
    pub(crate) async fn recv(&mut self) {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
