//! Output messages: the unit of work of the serializer.
//!
//! ## Contents
//! - [`Message`] closed four-variant enum (progress, info, prompt, exit)
//! - [`ExitCode`] process exit status carried by [`Message::Exit`]
//!
//! ## Quick reference
//! - **Producers**: every [`Lifecycle`](crate::Lifecycle) operation builds one message.
//! - **Consumer**: the serializer task, which renders each message exactly once.

mod message;

pub use message::{ExitCode, Message};
