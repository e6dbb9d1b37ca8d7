//! Terminal plumbing: rendering, line input, and process termination.
//!
//! ## Contents
//! - [`Renderer`] carriage-return based rendering with progress-line tracking
//! - [`StdinReader`] shared line reader for prompt replies and the cancel watch
//! - [`ExitHook`], [`ProcessExit`] how the serializer ends the process

mod exit;
mod reader;
mod renderer;

pub use exit::{ExitHook, ProcessExit};
pub use reader::StdinReader;
pub use renderer::Renderer;
