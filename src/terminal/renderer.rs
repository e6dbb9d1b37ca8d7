//! # Line-overwriting renderer.
//!
//! [`Renderer`] turns [`Message`](crate::messages::Message) payloads into
//! carriage-return based terminal output and remembers the progress line that
//! is currently on screen.
//!
//! ## Algorithm
//! ```text
//! Progress(new):  "\r" new pad(cache, new)            cache = new
//! Info(text):     cache empty → text "\n"
//!                 otherwise   → "\r" text pad(cache, text) "\n" cache
//! Prompt(text):   cache empty → text
//!                 otherwise   → "\r" text pad(cache, text)
//! Exit(text):     "\n" text "\n"
//!
//! pad(prev, new) = " " × max(0, chars(prev) − chars(new))
//! ```
//!
//! ## Rules
//! - Lengths are counted in chars (Unicode scalar values), the same unit that is printed.
//!   Wide glyphs occupy two columns but count as one, so a shorter line may leave
//!   residue after a line made of wide glyphs.
//! - Every render ends with a flush, so the terminal reflects the state after each message.
//! - The renderer is owned by a single task; it is not `Sync` by intent.

use std::io::{self, Write};

/// Number of spaces needed to erase what is left of `previous` after printing `new`.
#[inline]
pub(crate) fn pad_len(previous: &str, new: &str) -> usize {
    previous
        .chars()
        .count()
        .saturating_sub(new.chars().count())
}

/// Renders messages to `W` and tracks the visible progress line.
pub struct Renderer<W: Write> {
    out: W,
    progress_cache: String,
}

impl<W: Write> Renderer<W> {
    /// Creates a renderer with no progress line on screen.
    pub fn new(out: W) -> Self {
        Self {
            out,
            progress_cache: String::new(),
        }
    }

    /// Text of the progress line currently on screen (empty if none).
    #[cfg(test)]
    pub(crate) fn progress_line(&self) -> &str {
        &self.progress_cache
    }

    /// Overwrites the progress line in place.
    pub fn progress(&mut self, content: &str) -> io::Result<()> {
        self.overwrite_line(content)?;
        self.progress_cache.clear();
        self.progress_cache.push_str(content);
        self.out.flush()
    }

    /// Prints `content` above the progress line, keeping progress as the last line.
    pub fn info(&mut self, content: &str) -> io::Result<()> {
        if self.progress_cache.is_empty() {
            writeln!(self.out, "{content}")?;
        } else {
            self.overwrite_line(content)?;
            write!(self.out, "\n{}", self.progress_cache)?;
        }
        self.out.flush()
    }

    /// Prints a question, leaving the cursor right after it for the answer.
    pub fn prompt(&mut self, content: &str) -> io::Result<()> {
        if self.progress_cache.is_empty() {
            write!(self.out, "{content}")?;
        } else {
            self.overwrite_line(content)?;
        }
        self.out.flush()
    }

    /// Prints the final text on its own line.
    pub fn exit(&mut self, content: &str) -> io::Result<()> {
        writeln!(self.out, "\n{content}")?;
        self.out.flush()
    }

    /// Returns the inner writer.
    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn overwrite_line(&mut self, content: &str) -> io::Result<()> {
        let pad = pad_len(&self.progress_cache, content);
        write!(self.out, "\r{content}{:pad$}", "")
    }
}
