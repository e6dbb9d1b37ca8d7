//! # Lifecycle: the process-wide handle to terminal output and job supervision.
//!
//! [`Lifecycle`] is the only way producers reach the output serializer and the
//! progress supervisor. It is built once at process start with
//! [`Lifecycle::builder`] and passed explicitly to whoever needs it; clones are
//! cheap and all refer to the same serializer.
//!
//! ## Lifecycle of the handle
//! ```text
//! main()
//!   └─► Lifecycle::builder(cfg).build()      spawns the serializer task
//!         ├─► progress / info / prompt       producers, any task
//!         ├─► initiate_progress_reporting    at most once has effect
//!         └─► exit / surrender_control       caller parks; the serializer ends the process
//! ```
//!
//! There is no teardown: the handle lives until the process exits.
//!
//! ## Example
//! ```no_run
//! use jobvisor::{Config, ExitCode, Lifecycle};
//!
//! #[tokio::main]
//! async fn main() {
//!     let lc = Lifecycle::builder(Config::default()).build();
//!
//!     lc.progress("Copying 10%").await;
//!     lc.info("found 3 files").await;
//!     if lc.prompt("Overwrite? [y/n]").await != "y" {
//!         lc.exit("nothing to do", ExitCode(0)).await;
//!     }
//!     lc.exit("All done", ExitCode(0)).await;
//! }
//! ```

use std::io::Write;
use std::sync::Arc;

use tokio::io::AsyncBufRead;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::config::Config;
use crate::core::serializer::Serializer;
use crate::core::supervisor::ProgressSupervisor;
use crate::messages::{ExitCode, Message};
use crate::terminal::{ExitHook, ProcessExit, StdinReader};
use crate::work::WorkController;

struct Inner {
    cfg: Config,
    tx: mpsc::Sender<Message>,
    input: Arc<StdinReader>,
    exit: Arc<dyn ExitHook>,
    /// Cancelled once the serializer has stopped.
    terminated: CancellationToken,
    supervisor: ProgressSupervisor,
}

/// Handle to the output serializer and the progress supervisor.
#[derive(Clone)]
pub struct Lifecycle {
    inner: Arc<Inner>,
}

impl Lifecycle {
    /// Starts building a lifecycle with the given configuration.
    pub fn builder(cfg: Config) -> LifecycleBuilder {
        LifecycleBuilder::new(cfg)
    }

    /// Overwrites the progress line.
    ///
    /// Waits only while the message queue is full.
    pub async fn progress(&self, text: impl Into<String>) {
        self.enqueue(Message::Progress(text.into())).await;
    }

    /// Prints a line above the progress line.
    ///
    /// Waits only while the message queue is full.
    pub async fn info(&self, text: impl Into<String>) {
        self.enqueue(Message::Info(text.into())).await;
    }

    /// Asks the user a question and returns the answer, trimmed.
    ///
    /// Messages queued after the prompt are rendered only once the user has answered.
    pub async fn prompt(&self, text: impl Into<String>) -> String {
        let (reply, answer) = oneshot::channel();
        self.enqueue(Message::Prompt {
            content: text.into(),
            reply,
        })
        .await;

        match answer.await {
            Ok(line) => line,
            Err(_) => {
                // The serializer is gone: the process is ending.
                self.surrender_control().await;
                String::new()
            }
        }
    }

    /// Prints `text` as the last output and ends the process with `code`.
    ///
    /// Every message queued before this one is rendered first. The call parks
    /// like [`surrender_control`](Self::surrender_control) and does not return
    /// while the process is alive.
    pub async fn exit(&self, text: impl Into<String>, code: ExitCode) {
        self.enqueue(Message::Exit {
            content: text.into(),
            code,
        })
        .await;
        self.surrender_control().await;
    }

    /// Parks the caller; from here the process lifetime belongs to the serializer and supervisor.
    ///
    /// Resolves only once the serializer has stopped. With the default
    /// [`ProcessExit`] hook the process is gone before that, so this never returns.
    pub async fn surrender_control(&self) {
        self.inner.terminated.cancelled().await;
    }

    /// Starts babysitting a job through `controller`.
    ///
    /// When `is_interactive` is `false`, the cancel keyword typed on stdin also
    /// cancels the job. Only the first call, across all clones and tasks, has
    /// an effect; it returns `true`.
    pub fn initiate_progress_reporting(
        &self,
        controller: Arc<dyn WorkController>,
        is_interactive: bool,
    ) -> bool {
        self.inner
            .supervisor
            .initiate(self, controller, is_interactive)
    }

    /// True once progress reporting has been started.
    pub fn is_reporting_progress(&self) -> bool {
        self.inner.supervisor.is_started()
    }

    /// True once the serializer has stopped.
    ///
    /// Only observable with an [`ExitHook`] that returns.
    pub fn is_terminated(&self) -> bool {
        self.inner.terminated.is_cancelled()
    }

    pub(crate) fn config(&self) -> &Config {
        &self.inner.cfg
    }

    pub(crate) fn input(&self) -> &StdinReader {
        &self.inner.input
    }

    pub(crate) fn exit_hook(&self) -> &dyn ExitHook {
        self.inner.exit.as_ref()
    }

    pub(crate) fn termination(&self) -> &CancellationToken {
        &self.inner.terminated
    }

    async fn enqueue(&self, msg: Message) {
        if let Err(mpsc::error::SendError(msg)) = self.inner.tx.send(msg).await {
            debug!(kind = msg.as_label(), "serializer stopped; message dropped");
        }
    }
}

/// Builder for [`Lifecycle`].
///
/// Defaults: real stdout, real stdin, [`ProcessExit`].
pub struct LifecycleBuilder {
    cfg: Config,
    output: Option<Box<dyn Write + Send>>,
    input: Option<StdinReader>,
    exit: Option<Arc<dyn ExitHook>>,
}

impl LifecycleBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            output: None,
            input: None,
            exit: None,
        }
    }

    /// Renders to `output` instead of stdout.
    pub fn with_output<W>(mut self, output: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.output = Some(Box::new(output));
        self
    }

    /// Reads prompt answers and the cancel keyword from `input` instead of stdin.
    pub fn with_input<R>(mut self, input: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        self.input = Some(StdinReader::new(input));
        self
    }

    /// Ends the process through `hook` instead of [`std::process::exit`].
    pub fn with_exit_hook(mut self, hook: Arc<dyn ExitHook>) -> Self {
        self.exit = Some(hook);
        self
    }

    /// Builds the lifecycle and spawns its serializer task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Lifecycle {
        let (tx, rx) = mpsc::channel(self.cfg.queue_capacity_clamped());
        let output: Box<dyn Write + Send> = match self.output {
            Some(output) => output,
            None => Box::new(std::io::stdout()),
        };
        let input = Arc::new(self.input.unwrap_or_else(StdinReader::stdin));
        let exit: Arc<dyn ExitHook> = match self.exit {
            Some(exit) => exit,
            None => Arc::new(ProcessExit),
        };
        let terminated = CancellationToken::new();

        Serializer::new(
            rx,
            output,
            Arc::clone(&input),
            Arc::clone(&exit),
            terminated.clone(),
        )
        .spawn();

        Lifecycle {
            inner: Arc::new(Inner {
                cfg: self.cfg,
                tx,
                input,
                exit,
                terminated,
                supervisor: ProgressSupervisor::new(),
            }),
        }
    }
}
