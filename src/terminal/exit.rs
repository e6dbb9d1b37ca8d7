//! # Process termination seam.
//!
//! The serializer ends the process through an [`ExitHook`] after the Exit message
//! has been flushed. [`ProcessExit`] is the real implementation. Test harnesses
//! install a hook that records the code and returns, which lets the runtime wind
//! down instead of killing the test binary.

use crate::error::LifecycleError;
use crate::messages::ExitCode;

/// Terminates the process on behalf of the serializer.
pub trait ExitHook: Send + Sync + 'static {
    /// Ends the process with `code`.
    ///
    /// The real implementation never returns. If an implementation does return,
    /// the serializer stops and the lifecycle is marked terminated.
    fn exit(&self, code: ExitCode);

    /// Ends the process after an unrecoverable terminal failure.
    ///
    /// Default: [`std::process::abort`].
    fn abort(&self, err: &LifecycleError) {
        let _ = err;
        std::process::abort();
    }
}

/// Exits the real process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExit;

impl ExitHook for ProcessExit {
    fn exit(&self, code: ExitCode) {
        std::process::exit(code.code());
    }
}
