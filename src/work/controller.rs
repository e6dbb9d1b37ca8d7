//! # Work controller trait.
//!
//! A [`WorkController`] is how the progress supervisor learns about the job it
//! babysits. Once per tick the supervisor calls exactly one of its methods:
//!
//! ```text
//! tick:
//!   cancellation pending? ── yes ──► controller.cancel(&lifecycle)
//!            └───────────── no ───► controller.report_progress_or_exit(&lifecycle)
//! sleep(poll_interval)
//! ```
//!
//! ## Rules
//! - The supervisor has no other way to stop polling: the controller must call
//!   [`Lifecycle::exit`](crate::Lifecycle::exit) once the job is over.
//! - Calls are awaited without timeout; a hung call stalls the supervisor.
//! - A panicking call is caught and logged; polling resumes at the next tick.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use jobvisor::{ExitCode, Lifecycle, WorkController};
//!
//! struct Upload;
//!
//! #[async_trait]
//! impl WorkController for Upload {
//!     async fn cancel(&self, lifecycle: &Lifecycle) {
//!         // stop the transfer, then leave
//!         lifecycle.exit("upload cancelled", ExitCode(1)).await;
//!     }
//!
//!     async fn report_progress_or_exit(&self, lifecycle: &Lifecycle) {
//!         lifecycle.progress("uploading...").await;
//!     }
//!
//!     fn name(&self) -> &'static str { "upload" }
//! }
//! ```

use async_trait::async_trait;

use crate::core::Lifecycle;

/// Job status and cancellation callbacks.
#[async_trait]
pub trait WorkController: Send + Sync + 'static {
    /// Stops the job; called on the first tick after a cancellation request.
    ///
    /// Typically ends with [`Lifecycle::exit`], directly or on a later tick.
    async fn cancel(&self, lifecycle: &Lifecycle);

    /// Surfaces job status through `lifecycle`, and exits once the job is done.
    async fn report_progress_or_exit(&self, lifecycle: &Lifecycle);

    /// Returns the controller name used in logs.
    ///
    /// The default uses `type_name::<Self>()`.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
