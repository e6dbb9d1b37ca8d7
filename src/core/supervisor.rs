//! # Progress supervisor: polls a job and routes cancellation to it.
//!
//! [`ProgressSupervisor`] is started at most once per [`Lifecycle`]. Starting it
//! spawns a poll loop that calls the [`WorkController`] once per tick, plus up to
//! two cancellation sources feeding one capacity-1 signal holder.
//!
//! ## Architecture
//! ```text
//! Idle ──(CAS false→true)──► Running ──► poll loop (never leaves; ends with the process)
//!
//! Cancellation sources:                     Poll loop (every poll_interval):
//!   ShutdownSignals::recv() ──┐               ├─ try_recv(cancel)
//!                             ├─► [mpsc(1)] ──┤     ├─ Some → controller.cancel(&lc)
//!   stdin "cancel" watcher  ──┘   try_send    │     └─ None → controller.report_progress_or_exit(&lc)
//!   (non-interactive only)                    └─ sleep(poll_interval)
//! ```
//!
//! ## Rules
//! - Only the first `initiate` call has an effect; others return `false`.
//! - Cancellation is observed at the start of a tick; an in-flight controller call is not preempted.
//! - A full holder drops the new request: one pending cancellation is all that matters.
//! - A panicking `cancel` call puts its request back; the next tick cancels again.
//! - The keyword watcher stops after forwarding its first cancellation.
//! - Every task stops when the lifecycle terminates (only observable with a test exit hook).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::Lifecycle;
use crate::core::shutdown::ShutdownSignals;
use crate::error::LifecycleError;
use crate::work::WorkController;

/// Where a cancellation request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CancelSource {
    /// OS termination signal.
    Signal,
    /// Cancel keyword typed on stdin.
    Keyword,
}

/// Once-only starter of the poll loop.
pub(crate) struct ProgressSupervisor {
    started: AtomicBool,
}

impl ProgressSupervisor {
    pub(crate) fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
        }
    }

    /// True once the poll loop has been started.
    pub(crate) fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Performs the `Idle → Running` transition and spawns the supervision tasks.
    ///
    /// Returns `false` (and does nothing) if supervision was already started.
    pub(crate) fn initiate(
        &self,
        lifecycle: &Lifecycle,
        controller: Arc<dyn WorkController>,
        is_interactive: bool,
    ) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(
                controller = controller.name(),
                "progress reporting already started"
            );
            return false;
        }

        let cfg = lifecycle.config();
        let stop = lifecycle.termination().clone();
        let (tx, rx) = mpsc::channel::<CancelSource>(1);

        if cfg.watch_signals {
            tokio::spawn(forward_signals(tx.clone(), stop.clone()));
        }
        if !is_interactive {
            tokio::spawn(forward_cancel_keyword(lifecycle.clone(), tx.clone()));
        }

        debug!(
            controller = controller.name(),
            interval = ?cfg.poll_interval_clamped(),
            is_interactive,
            "progress reporting started"
        );
        tokio::spawn(poll_loop(
            lifecycle.clone(),
            controller,
            tx,
            rx,
            cfg.poll_interval_clamped(),
        ));
        true
    }
}

/// Forwards every OS termination signal into the cancellation holder.
async fn forward_signals(tx: mpsc::Sender<CancelSource>, stop: CancellationToken) {
    let mut signals = match ShutdownSignals::register() {
        Ok(s) => s,
        Err(e) => {
            let err = LifecycleError::SignalRegistration(e);
            warn!(error = %err, label = err.as_label(), "signal cancellation disabled");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = stop.cancelled() => return,
            _ = signals.recv() => {
                info!("termination signal received");
                let _ = tx.try_send(CancelSource::Signal);
            }
        }
    }
}

/// Reads stdin lines until the cancel keyword shows up, then forwards it once.
async fn forward_cancel_keyword(lifecycle: Lifecycle, tx: mpsc::Sender<CancelSource>) {
    let stop = lifecycle.termination().clone();
    loop {
        let line = tokio::select! {
            _ = stop.cancelled() => return,
            line = lifecycle.input().read_clean_line() => line,
        };
        match line {
            Ok(line) if lifecycle.config().is_cancel_keyword(&line) => {
                info!("cancel keyword received on stdin");
                let _ = tx.try_send(CancelSource::Keyword);
                return;
            }
            Ok(_) => {}
            Err(err) => {
                error!(error = %err, label = err.as_label(), "cannot watch stdin for cancel keyword");
                lifecycle.exit_hook().abort(&err);
                return;
            }
        }
    }
}

/// Calls the controller once per tick until the lifecycle terminates.
///
/// `retry` feeds the same holder as `cancel`; a `cancel` call that panics is re-queued.
async fn poll_loop(
    lifecycle: Lifecycle,
    controller: Arc<dyn WorkController>,
    retry: mpsc::Sender<CancelSource>,
    mut cancel: mpsc::Receiver<CancelSource>,
    interval: Duration,
) {
    let stop = lifecycle.termination().clone();
    loop {
        let pending = cancel.try_recv().ok();
        let tick = async {
            match pending {
                Some(source) => {
                    info!(?source, controller = controller.name(), "cancelling job");
                    controller.cancel(&lifecycle).await;
                }
                None => controller.report_progress_or_exit(&lifecycle).await,
            }
        };

        tokio::select! {
            _ = stop.cancelled() => break,
            res = AssertUnwindSafe(tick).catch_unwind() => {
                if let Err(panic_err) = res {
                    error!(
                        controller = controller.name(),
                        cancelling = pending.is_some(),
                        "work controller panicked: {:?}",
                        panic_err
                    );
                    // Put the request back so the next tick cancels again.
                    if let Some(source) = pending {
                        let _ = retry.try_send(source);
                    }
                }
            }
        }

        tokio::select! {
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    debug!(controller = controller.name(), "progress reporting stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::messages::ExitCode;
    use crate::test_support::{RecordingExit, SharedBuf};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::Instant;

    /// Controller method invoked on a tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Report,
        Cancel,
    }

    /// What the mock does when asked to cancel.
    #[derive(Clone, Copy)]
    enum OnCancel {
        Nothing,
        Exit,
        PanicOnce,
    }

    struct MockController {
        calls: Mutex<Vec<(Call, Instant)>>,
        on_cancel: OnCancel,
        /// Exit with code 0 on this report call (1-based).
        finish_on_report: Option<usize>,
    }

    impl MockController {
        fn new(on_cancel: OnCancel, finish_on_report: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                on_cancel,
                finish_on_report,
            })
        }

        /// Records `call` and returns how many calls of that kind happened so far.
        fn record(&self, call: Call) -> usize {
            let mut calls = self.calls.lock().unwrap();
            calls.push((call, Instant::now()));
            calls.iter().filter(|(c, _)| *c == call).count()
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().iter().map(|(c, _)| *c).collect()
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }

        fn count(&self, call: Call) -> usize {
            self.calls().into_iter().filter(|c| *c == call).count()
        }

        fn reports(&self) -> usize {
            self.count(Call::Report)
        }

        fn cancels(&self) -> usize {
            self.count(Call::Cancel)
        }
    }

    #[async_trait]
    impl WorkController for MockController {
        async fn cancel(&self, lifecycle: &Lifecycle) {
            let n = self.record(Call::Cancel);
            match self.on_cancel {
                OnCancel::Nothing => {}
                OnCancel::Exit => lifecycle.exit("cancelled", ExitCode(1)).await,
                OnCancel::PanicOnce if n == 1 => panic!("cleanup failed"),
                OnCancel::PanicOnce => {}
            }
        }

        async fn report_progress_or_exit(&self, lifecycle: &Lifecycle) {
            let n = self.record(Call::Report);
            if self.finish_on_report == Some(n) {
                lifecycle.exit("All done", ExitCode(0)).await;
            } else {
                lifecycle.progress(format!("tick {n}")).await;
            }
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    struct PanickyController {
        reports: AtomicUsize,
    }

    #[async_trait]
    impl WorkController for PanickyController {
        async fn cancel(&self, _lifecycle: &Lifecycle) {}

        async fn report_progress_or_exit(&self, _lifecycle: &Lifecycle) {
            let n = self.reports.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                panic!("status endpoint exploded");
            }
        }
    }

    fn lifecycle_with(
        cfg: Config,
        input: &'static [u8],
    ) -> (Lifecycle, SharedBuf, Arc<RecordingExit>) {
        let out = SharedBuf::default();
        let exit = Arc::new(RecordingExit::default());
        let lc = Lifecycle::builder(cfg)
            .with_output(out.clone())
            .with_input(input)
            .with_exit_hook(exit.clone())
            .build();
        (lc, out, exit)
    }

    fn lifecycle(input: &'static [u8]) -> (Lifecycle, SharedBuf, Arc<RecordingExit>) {
        let cfg = Config {
            watch_signals: false,
            ..Config::default()
        };
        lifecycle_with(cfg, input)
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_once_per_tick() {
        let (lc, out, _exit) = lifecycle(b"");
        let ctl = MockController::new(OnCancel::Nothing, None);

        assert!(lc.initiate_progress_reporting(ctl.clone(), true));
        // Ticks at t=0, 2s, 4s.
        tokio::time::sleep(Duration::from_millis(4_500)).await;

        assert_eq!(ctl.reports(), 3);
        assert_eq!(ctl.cancels(), 0);
        assert!(out.contents().ends_with("\rtick 3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_initiation_runs_one_loop() {
        let (lc, _out, _exit) = lifecycle(b"");
        let ctl = MockController::new(OnCancel::Nothing, None);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let lc = lc.clone();
            let ctl = ctl.clone();
            handles.push(tokio::spawn(async move {
                lc.initiate_progress_reporting(ctl, true)
            }));
        }
        let mut started = 0;
        for h in handles {
            if h.await.unwrap() {
                started += 1;
            }
        }
        assert_eq!(started, 1);

        tokio::time::sleep(Duration::from_millis(4_500)).await;
        assert_eq!(ctl.reports(), 3, "one loop, not eight");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_initiation_single_winner() {
        let (lc, _out, _exit) = lifecycle(b"");
        let ctl = MockController::new(OnCancel::Nothing, None);
        let barrier = Arc::new(tokio::sync::Barrier::new(16));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let lc = lc.clone();
            let ctl = ctl.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                lc.initiate_progress_reporting(ctl, true)
            }));
        }
        let mut started = 0;
        for h in handles {
            if h.await.unwrap() {
                started += 1;
            }
        }
        assert_eq!(started, 1);
        assert!(lc.is_reporting_progress());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyword_cancels_on_next_tick_and_stops_reading() {
        let (lc, _out, _exit) = lifecycle(b"status\n  CANCEL \nignored\n");
        let ctl = MockController::new(OnCancel::Nothing, None);

        assert!(lc.initiate_progress_reporting(ctl.clone(), false));
        tokio::time::sleep(Duration::from_millis(4_500)).await;

        // Three ticks, one call each: the cancelling tick made no report.
        assert_eq!(ctl.cancels(), 1);
        assert_eq!(ctl.reports(), 2);
        let times = ctl.call_times();
        assert_eq!(times.len(), 3);
        assert!(times.windows(2).all(|w| w[0] < w[1]), "two calls in one tick");

        // The watcher stopped after the keyword; the next line is still there.
        assert_eq!(lc.prompt("Next? ").await, "ignored");
    }

    #[tokio::test(start_paused = true)]
    async fn test_interactive_mode_ignores_stdin_keyword() {
        let (lc, _out, _exit) = lifecycle(b"cancel\n");
        let ctl = MockController::new(OnCancel::Nothing, None);

        assert!(lc.initiate_progress_reporting(ctl.clone(), true));
        tokio::time::sleep(Duration::from_millis(4_500)).await;

        assert_eq!(ctl.cancels(), 0);
        assert_eq!(ctl.reports(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_that_exits_stops_polling() {
        let (lc, out, exit) = lifecycle(b"cancel\n");
        let ctl = MockController::new(OnCancel::Exit, None);

        assert!(lc.initiate_progress_reporting(ctl.clone(), false));
        lc.surrender_control().await;

        let reports = ctl.reports();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(ctl.cancels(), 1);
        assert_eq!(ctl.reports(), reports, "no report after cancellation exited");
        assert_eq!(exit.codes(), vec![1]);
        assert!(out.contents().ends_with("\ncancelled\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_cancel_is_retried_next_tick() {
        let (lc, _out, _exit) = lifecycle(b"cancel\ncancel\ncancel\n");
        let ctl = MockController::new(OnCancel::PanicOnce, None);

        assert!(lc.initiate_progress_reporting(ctl.clone(), false));
        tokio::time::sleep(Duration::from_millis(6_500)).await;

        let calls = ctl.calls();
        assert_eq!(ctl.cancels(), 2, "calls: {calls:?}");
        let first = calls.iter().position(|c| *c == Call::Cancel).unwrap();
        assert_eq!(calls[first + 1], Call::Cancel, "calls: {calls:?}");
        // Only the first keyword was consumed by the watcher.
        assert_eq!(lc.prompt("Next? ").await, "cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_exits_when_job_completes() {
        let (lc, out, exit) = lifecycle(b"");
        let ctl = MockController::new(OnCancel::Nothing, Some(3));

        assert!(lc.initiate_progress_reporting(ctl.clone(), true));
        lc.surrender_control().await;

        assert!(lc.is_terminated());
        assert_eq!(ctl.reports(), 3);
        assert_eq!(exit.codes(), vec![0]);
        assert_eq!(out.contents(), "\rtick 1\rtick 2\nAll done\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyword_watch_on_closed_stdin_aborts() {
        let (lc, _out, exit) = lifecycle(b"");
        let ctl = MockController::new(OnCancel::Nothing, None);

        assert!(lc.initiate_progress_reporting(ctl.clone(), false));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(exit.aborts(), vec!["input_closed"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_panic_does_not_stop_loop() {
        let (lc, _out, _exit) = lifecycle(b"");
        let ctl = Arc::new(PanickyController {
            reports: AtomicUsize::new(0),
        });

        assert!(lc.initiate_progress_reporting(ctl.clone(), true));
        tokio::time::sleep(Duration::from_millis(4_500)).await;

        assert_eq!(ctl.reports.load(Ordering::SeqCst), 3);
    }

    #[cfg(unix)]
    async fn wait_until(cond: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial_test::serial(os_signals)]
    async fn test_signals_collapse_into_one_cancel() {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        // Keeps SIGTERM routed to tokio so raising it never kills the test binary.
        let _routed = ShutdownSignals::register().expect("register");

        let cfg = Config {
            poll_interval: Duration::from_millis(300),
            ..Config::default()
        };
        let (lc, _out, _exit) = lifecycle_with(cfg, b"");
        let ctl = MockController::new(OnCancel::Nothing, None);
        assert!(lc.initiate_progress_reporting(ctl.clone(), true));

        // The listener is registered before the first tick runs.
        wait_until(|| ctl.reports() >= 1).await;
        for _ in 0..3 {
            kill(Pid::this(), Signal::SIGTERM).expect("send SIGTERM");
        }
        wait_until(|| ctl.cancels() >= 1).await;
        tokio::time::sleep(Duration::from_millis(700)).await;

        let calls = ctl.calls();
        assert_eq!(ctl.cancels(), 1, "calls: {calls:?}");
        assert_eq!(calls.last(), Some(&Call::Report), "polling resumed");
    }
}
