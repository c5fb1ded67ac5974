//! One editing session: a worker task owning the reconciler.
//!
//! Each `start_reconciled_parse` call supersedes the previous one. Updates are
//! delivered to the callback registered with the newest call only.

use hisab_core::{ParseResult, ParseStatus};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::controller::{Disposition, Reconciler, Update};

type UpdateFn = Box<dyn FnMut(&ParseResult, ParseStatus) + Send + 'static>;

enum Command {
    Submit {
        ticket: u64,
        message: String,
        on_update: UpdateFn,
    },
    Cancel {
        ticket: u64,
    },
    Close,
}

pub struct ParseSession {
    tx: mpsc::UnboundedSender<Command>,
    worker: JoinHandle<()>,
    next_ticket: u64,
}

/// Abandons the remote call started by one `start_reconciled_parse` call
#[derive(Clone)]
pub struct CancelHandle {
    ticket: u64,
    tx: mpsc::UnboundedSender<Command>,
}

impl CancelHandle {
    /// Moves the session to `fallback` if this call is still the current one
    /// and still pending; otherwise does nothing.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel {
            ticket: self.ticket,
        });
    }
}

impl ParseSession {
    /// Spawn the worker. Must be called inside a tokio runtime.
    pub fn spawn(reconciler: Reconciler) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(reconciler, rx));
        Self {
            tx,
            worker,
            next_ticket: 0,
        }
    }

    /// Submit a new input. The callback sees the eager local result first,
    /// then at most one more update when the remote call settles.
    pub fn start_reconciled_parse<F>(&mut self, raw: &str, on_update: F) -> CancelHandle
    where
        F: FnMut(&ParseResult, ParseStatus) + Send + 'static,
    {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let _ = self.tx.send(Command::Submit {
            ticket,
            message: raw.to_string(),
            on_update: Box::new(on_update),
        });
        CancelHandle {
            ticket,
            tx: self.tx.clone(),
        }
    }

    /// Stop the worker and wait for it to exit. Any call in flight is aborted.
    pub async fn shutdown(mut self) {
        let _ = self.tx.send(Command::Close);
        let _ = (&mut self.worker).await;
    }
}

impl Drop for ParseSession {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

fn emit(on_update: &mut Option<UpdateFn>, update: &Update) {
    if let Some(cb) = on_update.as_mut() {
        cb(&update.result, update.status);
    }
}

async fn run_worker(mut reconciler: Reconciler, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut on_update: Option<UpdateFn> = None;
    let mut current_ticket = 0u64;

    loop {
        tokio::select! {
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    Command::Close => break,
                    Command::Submit { ticket, message, on_update: cb } => {
                        current_ticket = ticket;
                        on_update = Some(cb);
                        let update = reconciler.submit(&message);
                        emit(&mut on_update, &update);
                    }
                    Command::Cancel { ticket } => {
                        if ticket != current_ticket {
                            debug!(ticket, current_ticket, "cancel for superseded call ignored");
                            continue;
                        }
                        let generation = reconciler.generation();
                        if let Some(update) = reconciler.cancel(generation) {
                            emit(&mut on_update, &update);
                        }
                    }
                }
            }
            Some(outcome) = reconciler.next_outcome() => {
                if let Disposition::Applied(update) = reconciler.apply(outcome) {
                    emit(&mut on_update, &update);
                }
            }
        }
    }
}
