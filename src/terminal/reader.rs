//! # Shared standard-input line reader.
//!
//! [`StdinReader`] reads one newline-terminated line at a time and returns it
//! without the terminator and without surrounding spaces.
//!
//! ## Rules
//! - One reader per process owns the underlying stream; Prompt replies and the
//!   cancel-keyword watch both go through it, so bytes buffered by one are never
//!   lost to the other.
//! - The stream lock is held for exactly one line. Two concurrent callers get
//!   consecutive lines in lock order, never a torn line.
//! - End of stream is [`LifecycleError::InputClosed`]; the caller decides it is fatal.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use crate::error::LifecycleError;

/// Strips the line terminator and surrounding spaces.
#[inline]
pub(crate) fn clean_line(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '\n' || c == '\r' || c == ' ')
}

/// Line reader over the process input.
pub struct StdinReader {
    inner: Mutex<Box<dyn AsyncBufRead + Send + Unpin>>,
}

impl StdinReader {
    /// Reader over the real standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }

    /// Reader over any buffered async source.
    pub fn new<R>(source: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        Self {
            inner: Mutex::new(Box::new(source)),
        }
    }

    /// Reads one line and returns it cleaned.
    ///
    /// A final line without a terminator is returned as is; a read that yields
    /// no bytes at all is [`LifecycleError::InputClosed`].
    pub async fn read_clean_line(&self) -> Result<String, LifecycleError> {
        let mut source = self.inner.lock().await;
        let mut raw = String::new();
        let n = source
            .read_line(&mut raw)
            .await
            .map_err(LifecycleError::InputRead)?;
        if n == 0 {
            return Err(LifecycleError::InputClosed);
        }
        Ok(clean_line(&raw).to_owned())
    }
}
