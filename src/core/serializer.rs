//! # Output serializer: the single owner of standard output.
//!
//! One consumer task drains the bounded message queue and renders every
//! [`Message`] in arrival order through a [`Renderer`].
//!
//! ## Architecture
//! ```text
//! Producers (many):                        Consumer (one):
//!   main command ──┐
//!   poll loop    ──┼──► [bounded mpsc] ──► Serializer::run()
//!   error paths  ──┘     (queue_capacity)     ├─ Progress/Info → Renderer
//!                                             ├─ Prompt → Renderer, StdinReader, reply
//!                                             └─ Exit → Renderer, ExitHook::exit
//! ```
//!
//! ## Rules
//! - Strict FIFO; no priorities. Messages queued behind a Prompt wait for the user's answer.
//! - The progress cache lives in the renderer and is only touched by this task.
//! - The process ends from here and only here, after the Exit text has been flushed.
//! - Unrecoverable stdin failure goes to [`ExitHook::abort`].
//! - If the hook returns (test harness), the task stops and cancels `terminated`.

use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::messages::Message;
use crate::terminal::{ExitHook, Renderer, StdinReader};

/// What the consumer does after rendering one message.
enum Flow {
    Continue,
    Terminate,
}

/// Consumer side of the message queue.
pub(crate) struct Serializer {
    rx: mpsc::Receiver<Message>,
    renderer: Renderer<Box<dyn Write + Send>>,
    input: Arc<StdinReader>,
    exit: Arc<dyn ExitHook>,
    terminated: CancellationToken,
}

impl Serializer {
    pub(crate) fn new(
        rx: mpsc::Receiver<Message>,
        output: Box<dyn Write + Send>,
        input: Arc<StdinReader>,
        exit: Arc<dyn ExitHook>,
        terminated: CancellationToken,
    ) -> Self {
        Self {
            rx,
            renderer: Renderer::new(output),
            input,
            exit,
            terminated,
        }
    }

    /// Spawns the consumer task.
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            if let Flow::Terminate = self.handle(msg).await {
                break;
            }
        }
        // Only reachable when the exit hook returns or every producer handle is gone.
        self.rx.close();
        self.terminated.cancel();
        debug!("output serializer stopped");
    }

    async fn handle(&mut self, msg: Message) -> Flow {
        match msg {
            Message::Progress(content) => {
                if let Err(e) = self.renderer.progress(&content) {
                    warn!(error = %e, kind = "progress", "terminal write failed");
                }
                Flow::Continue
            }
            Message::Info(content) => {
                if let Err(e) = self.renderer.info(&content) {
                    warn!(error = %e, kind = "info", "terminal write failed");
                }
                Flow::Continue
            }
            Message::Prompt { content, reply } => {
                if let Err(e) = self.renderer.prompt(&content) {
                    warn!(error = %e, kind = "prompt", "terminal write failed");
                }
                match self.input.read_clean_line().await {
                    Ok(answer) => {
                        if reply.send(answer).is_err() {
                            debug!("prompt caller went away before the answer arrived");
                        }
                        Flow::Continue
                    }
                    Err(err) => {
                        error!(error = %err, label = err.as_label(), "cannot read prompt answer");
                        self.exit.abort(&err);
                        Flow::Terminate
                    }
                }
            }
            Message::Exit { content, code } => {
                if let Err(e) = self.renderer.exit(&content) {
                    warn!(error = %e, kind = "exit", "terminal write failed");
                }
                debug!(%code, "exiting");
                self.exit.exit(code);
                Flow::Terminate
            }
        }
    }
}
