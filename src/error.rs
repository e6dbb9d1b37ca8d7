//! Error types used by the jobvisor runtime.
//!
//! There is a single enum, [`LifecycleError`], covering the few failures the
//! runtime can observe. None of them is recoverable from the producer side:
//! enqueueing never fails, and a failing terminal means the process cannot
//! talk to its user anymore.
//!
//! [`LifecycleError::as_label`] gives a short stable label for logs.

use thiserror::Error;

/// # Errors produced by the jobvisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Standard input reached end of stream while a line was expected.
    #[error("standard input closed")]
    InputClosed,

    /// Reading a line from standard input failed.
    #[error("failed to read from standard input: {0}")]
    InputRead(#[source] std::io::Error),

    /// OS termination signal listeners could not be installed.
    #[error("failed to register signal listeners: {0}")]
    SignalRegistration(#[source] std::io::Error),
}

impl LifecycleError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use jobvisor::LifecycleError;
    ///
    /// assert_eq!(LifecycleError::InputClosed.as_label(), "input_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleError::InputClosed => "input_closed",
            LifecycleError::InputRead(_) => "input_read",
            LifecycleError::SignalRegistration(_) => "signal_registration",
        }
    }
}
