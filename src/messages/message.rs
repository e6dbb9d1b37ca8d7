//! # Output message model.
//!
//! A [`Message`] describes one unit of terminal output together with the data
//! its variant needs. Messages are created by a producer call, consumed exactly
//! once by the serializer, then dropped.
//!
//! ## Rendering contract
//! ```text
//! Progress  → overwrite the progress line in place
//! Info      → print above the progress line (progress stays last)
//! Prompt    → print, read one stdin line, reply through the conduit
//! Exit      → print on a fresh line, terminate the process
//! ```

use tokio::sync::oneshot;

/// Process exit status.
///
/// The numeric taxonomy (success, failure, ...) belongs to the application;
/// the runtime only guarantees the process exits with this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(pub i32);

impl ExitCode {
    /// Raw value handed to the OS.
    #[inline]
    pub fn code(self) -> i32 {
        self.0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of output.
#[derive(Debug)]
pub enum Message {
    /// Printed on the same line over and over again; never floats up.
    Progress(String),

    /// Simple line; floats up above the progress line.
    Info(String),

    /// Question shown to the user; the trimmed answer goes back through `reply`.
    Prompt {
        /// Question text.
        content: String,
        /// One-shot reply conduit owned by the blocked caller.
        reply: oneshot::Sender<String>,
    },

    /// Last words of the process.
    Exit {
        /// Final text.
        content: String,
        /// Status the process terminates with.
        code: ExitCode,
    },
}

impl Message {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Message::Progress(_) => "progress",
            Message::Info(_) => "info",
            Message::Prompt { .. } => "prompt",
            Message::Exit { .. } => "exit",
        }
    }
}
