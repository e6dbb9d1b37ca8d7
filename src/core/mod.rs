//! Runtime core: output serialization and progress supervision.
//!
//! The only public API from this module is [`Lifecycle`] (with its builder)
//! and [`Config`].
//!
//! Internal modules:
//! - [`lifecycle`]: the handle producers use, and how it is built;
//! - [`serializer`]: the single consumer task that owns standard output;
//! - [`supervisor`]: once-only poll loop with dual-source cancellation;
//! - [`shutdown`]: cross-platform termination signal listeners;
//! - [`config`]: runtime settings.

mod config;
mod lifecycle;
mod serializer;
mod shutdown;
mod supervisor;

pub use config::Config;
pub use lifecycle::{Lifecycle, LifecycleBuilder};
