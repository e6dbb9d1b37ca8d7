//! The job-side collaborator of the progress supervisor.
//!
//! ## Contents
//! - [`WorkController`] status and cancellation callbacks, one call per tick

mod controller;

pub use controller::WorkController;
