//! # jobvisor
//!
//! **Jobvisor** is the single point of control for terminal output and
//! process lifecycle in a command-line tool that runs long background jobs.
//!
//! It solves two coupled problems:
//! - many producers (the command, pollers, error paths) write to one terminal
//!   without tearing the live progress line;
//! - a job running after the command handed off control is polled, reported,
//!   and cancellable by OS signal or by typing `cancel`, with never more than
//!   one poll loop.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌─────────────────────────┐
//!   │ main command │   │  error path  │   │ WorkController (per tick)│
//!   └──────┬───────┘   └──────┬───────┘   └────────────┬────────────┘
//!          ▼                  ▼                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Lifecycle (cloneable handle)                                     │
//! │  progress / info / prompt / exit / surrender_control              │
//! │  initiate_progress_reporting ──► ProgressSupervisor (CAS, once)   │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                   [bounded mpsc: Config::queue_capacity]
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │ Serializer (one task)  │──► Renderer ──► stdout
//!                       │                        │◄── StdinReader ◄── stdin
//!                       │                        │──► ExitHook (process exit)
//!                       └────────────────────────┘
//!
//! ProgressSupervisor:
//!   ShutdownSignals ──┐
//!                     ├─► [cancel holder, cap 1] ──► poll loop (every poll_interval)
//!   stdin "cancel" ───┘                               ├─ cancel pending → controller.cancel
//!                                                     └─ otherwise      → controller.report_progress_or_exit
//! ```
//!
//! ### Rendering
//! ```text
//! Progress  "\r" text pad                 (pad erases leftovers of the previous progress line)
//! Info      "\r" text pad "\n" progress   (progress stays the last visible line)
//! Prompt    "\r" text pad                 (cursor waits for the answer)
//! Exit      "\n" text "\n"                (then the process ends)
//! ```
//!
//! ## Features
//! | Area             | Description                                            | Key types / traits                  |
//! |------------------|--------------------------------------------------------|-------------------------------------|
//! | **Output**       | Ordered rendering through one consumer task.           | [`Lifecycle`], [`Message`]          |
//! | **Supervision**  | Once-only poll loop with signal/keyword cancellation.  | [`WorkController`]                  |
//! | **Terminal**     | Renderer, shared stdin reader, exit seam.              | [`Renderer`], [`StdinReader`], [`ExitHook`] |
//! | **Errors**       | Typed runtime errors.                                  | [`LifecycleError`]                  |
//! | **Configuration**| Queue capacity, cadence, cancel keyword.               | [`Config`]                          |
//!
//! ## Optional features
//! - `logging`: exports [`init_logging`], a stderr `tracing-subscriber` setup.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use jobvisor::{Config, ExitCode, Lifecycle, WorkController};
//!
//! struct CopyJob;
//!
//! #[async_trait]
//! impl WorkController for CopyJob {
//!     async fn cancel(&self, lc: &Lifecycle) {
//!         lc.exit("copy cancelled", ExitCode(1)).await;
//!     }
//!     async fn report_progress_or_exit(&self, lc: &Lifecycle) {
//!         lc.progress("Copying 42%").await;
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let lc = Lifecycle::builder(Config::default()).build();
//!     lc.info("job scheduled").await;
//!     lc.initiate_progress_reporting(Arc::new(CopyJob), false);
//!     lc.surrender_control().await;
//! }
//! ```
mod core;
mod error;
mod messages;
mod terminal;
mod work;

// ---- Public re-exports ----

pub use crate::core::{Config, Lifecycle, LifecycleBuilder};
pub use error::LifecycleError;
pub use messages::{ExitCode, Message};
pub use terminal::{ExitHook, ProcessExit, Renderer, StdinReader};
pub use work::WorkController;

// Optional: stderr diagnostics via tracing-subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod logging;
#[cfg(feature = "logging")]
pub use logging::{LOG_ENV, init_logging};
