//! Reconciliation state machine.
//!
//! idle -> pending -> {ready, fallback}. Every input change bumps the
//! generation; a remote outcome is applied only while its generation is
//! current and the call is still pending. Everything else is dropped.

use anyhow::Result;
use hisab_core::{ParseResult, ParseStatus};
use hisab_parse::LocalParser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{EngineConfig, Today};
use crate::merge::merge;
use crate::remote::{HttpInferenceClient, InferenceClient, RemoteError, RemoteParse};

/// A finished remote call, tagged with the generation it was started for
#[derive(Debug)]
pub struct RemoteOutcome {
    pub generation: u64,
    pub result: Result<RemoteParse, RemoteError>,
}

/// Snapshot of what callers see
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub generation: u64,
    pub status: ParseStatus,
    pub result: ParseResult,
}

/// What `apply` did with an outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Applied(Update),
    /// Outcome belongs to an older input (or an abandoned call). Not an error.
    Superseded,
}

pub struct Reconciler {
    client: Option<Arc<dyn InferenceClient>>,
    timeout: Duration,
    today: Today,
    generation: u64,
    status: ParseStatus,
    local: ParseResult,
    current: ParseResult,
    in_flight: Option<JoinHandle<()>>,
    outcomes_tx: mpsc::UnboundedSender<RemoteOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<RemoteOutcome>,
}

impl Reconciler {
    /// `client = None` parses locally only: every input ends in `fallback`.
    pub fn new(client: Option<Arc<dyn InferenceClient>>, timeout: Duration, today: Today) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            client,
            timeout,
            today,
            generation: 0,
            status: ParseStatus::Idle,
            local: ParseResult::empty(),
            current: ParseResult::empty(),
            in_flight: None,
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Result<Self> {
        let client: Option<Arc<dyn InferenceClient>> = if cfg.remote.enabled {
            Some(Arc::new(HttpInferenceClient::from_config(&cfg.remote)))
        } else {
            None
        };
        Ok(Self::new(
            client,
            cfg.remote.timeout(),
            Today::from_config(&cfg.parser)?,
        ))
    }

    /// Pin the default date instead of reading the clock
    pub fn with_today(mut self, today: Today) -> Self {
        self.today = today;
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> ParseStatus {
        self.status
    }

    pub fn result(&self) -> &ParseResult {
        &self.current
    }

    pub fn snapshot(&self) -> Update {
        Update {
            generation: self.generation,
            status: self.status,
            result: self.current.clone(),
        }
    }

    /// Input changed. Must run inside a tokio runtime when a client is set.
    pub fn submit(&mut self, raw: &str) -> Update {
        self.abort_in_flight();
        self.generation += 1;
        let generation = self.generation;

        if raw.trim().is_empty() {
            debug!(generation, "input cleared");
            self.local = ParseResult::empty();
            self.current = ParseResult::empty();
            self.status = ParseStatus::Idle;
            return self.snapshot();
        }

        self.local = LocalParser::new(self.today.date()).parse(raw);
        self.current = self.local.clone();

        match self.client.clone() {
            Some(client) => {
                debug!(generation, "starting remote inference");
                self.status = ParseStatus::Pending;
                self.in_flight = Some(self.spawn_remote(client, raw.to_string(), generation));
            }
            None => {
                self.status = ParseStatus::Fallback;
            }
        }

        self.snapshot()
    }

    fn spawn_remote(
        &self,
        client: Arc<dyn InferenceClient>,
        message: String,
        generation: u64,
    ) -> JoinHandle<()> {
        let tx = self.outcomes_tx.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            // inner task so a panicking client still reports an outcome
            let mut call = AbortOnDrop(tokio::spawn(async move {
                match tokio::time::timeout(timeout, client.infer(&message)).await {
                    Ok(r) => r,
                    Err(_) => Err(RemoteError::Timeout(timeout)),
                }
            }));
            let result = (&mut call.0)
                .await
                .unwrap_or_else(|e| Err(RemoteError::TaskFailed(e.to_string())));
            // receiver lives as long as the reconciler
            let _ = tx.send(RemoteOutcome { generation, result });
        })
    }

    /// Reduce one remote outcome into the exposed state
    pub fn apply(&mut self, outcome: RemoteOutcome) -> Disposition {
        if outcome.generation != self.generation || self.status != ParseStatus::Pending {
            debug!(
                outcome = outcome.generation,
                current = self.generation,
                "dropping superseded inference result"
            );
            return Disposition::Superseded;
        }

        self.in_flight = None;
        match outcome.result {
            Ok(remote) => {
                self.current = merge(&self.local, &remote);
                self.status = ParseStatus::Ready;
            }
            Err(e) => {
                warn!(generation = self.generation, error = %e, "remote inference unavailable, using local parse");
                self.current = self.local.clone();
                self.status = ParseStatus::Fallback;
            }
        }
        Disposition::Applied(self.snapshot())
    }

    /// Abandon the pending call for `generation`. No-op for older generations
    /// or when nothing is pending.
    pub fn cancel(&mut self, generation: u64) -> Option<Update> {
        if generation != self.generation || self.status != ParseStatus::Pending {
            return None;
        }
        debug!(generation, "remote inference abandoned");
        self.abort_in_flight();
        self.current = self.local.clone();
        self.status = ParseStatus::Fallback;
        Some(self.snapshot())
    }

    /// Wait for the next outcome from any spawned call, stale ones included
    pub async fn next_outcome(&mut self) -> Option<RemoteOutcome> {
        self.outcomes_rx.recv().await
    }

    /// Drive outcomes until the current input is no longer pending
    pub async fn settle(&mut self) -> Update {
        while self.status == ParseStatus::Pending {
            match self.next_outcome().await {
                Some(outcome) => {
                    self.apply(outcome);
                }
                None => break,
            }
        }
        self.snapshot()
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

/// Aborting the outer call task drops this and takes the client call down with it
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
