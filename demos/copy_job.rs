//! # Example: copy_job
//!
//! Babysits a fake file copy with [`Lifecycle`] and a [`WorkController`].
//!
//! Shows how to:
//! - Print info lines above a live progress line
//! - Ask the user a question before the job starts
//! - Hand control to the progress supervisor and let the controller exit
//! - Cancel with Ctrl-C, or by typing `cancel` when run non-interactively
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► Lifecycle::builder(cfg).build()
//!   ├─► prompt("Start copy? [y/n]")
//!   ├─► initiate_progress_reporting(CopyJob, interactive)
//!   └─► surrender_control()          (never returns)
//!
//! poll loop (every 500ms):
//!   ├─ report_progress_or_exit → progress("Copying N%") ... exit("All done", 0)
//!   └─ cancel                  → exit("Copy cancelled", 1)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example copy_job --features logging
//! echo -e "y\ncancel" | cargo run --example copy_job --features logging -- --non-interactive
//! ```

use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use jobvisor::{Config, ExitCode, Lifecycle, WorkController};

struct CopyJob {
    percent: AtomicU32,
    files: u32,
}

#[async_trait]
impl WorkController for CopyJob {
    async fn cancel(&self, lc: &Lifecycle) {
        let at = self.percent.load(Ordering::SeqCst);
        lc.info(format!("stopping at {at}%")).await;
        lc.exit("Copy cancelled", ExitCode(1)).await;
    }

    async fn report_progress_or_exit(&self, lc: &Lifecycle) {
        let pct = self.percent.fetch_add(7, Ordering::SeqCst).min(100);
        if pct >= 100 {
            lc.exit(format!("All done: {} files copied", self.files), ExitCode(0))
                .await;
            return;
        }
        if pct > 0 && pct % 21 == 0 {
            lc.info(format!("checkpoint at {pct}%")).await;
        }
        lc.progress(format!("Copying {pct}% of {} files", self.files))
            .await;
    }

    fn name(&self) -> &'static str {
        "copy-job"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    jobvisor::init_logging().map_err(|e| anyhow::anyhow!(e))?;

    let interactive = !std::env::args().any(|a| a == "--non-interactive")
        && std::io::stdin().is_terminal();

    let cfg = Config {
        poll_interval: Duration::from_millis(500),
        ..Config::default()
    };
    let lc = Lifecycle::builder(cfg).build();

    lc.info("=== copy_job example ===").await;
    if !lc.prompt("Start copy? [y/n] ").await.eq_ignore_ascii_case("y") {
        lc.exit("Nothing copied", ExitCode(0)).await;
    }

    let job = Arc::new(CopyJob {
        percent: AtomicU32::new(0),
        files: 1_284,
    });
    lc.initiate_progress_reporting(job.clone(), interactive);
    // Second call is a no-op.
    lc.initiate_progress_reporting(job, interactive);

    lc.surrender_control().await;
    Ok(())
}
