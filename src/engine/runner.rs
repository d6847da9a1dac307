//! Single-writer event loop around [`Engine`].

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Engine, Message, Reply};
use crate::config::ENGINE_CHANNEL_CAPACITY;
use crate::error_handling::DropStats;
use crate::persistence::{sleep_until_deadline, PersistedState, StateSink};

type Command = (Message, oneshot::Sender<Reply>);

/// Cloneable sender side of a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
    stats: Arc<DropStats>,
}

impl EngineHandle {
    /// Sends a message and waits for its reply.
    ///
    /// Returns `None` once the engine has stopped.
    pub async fn send(&self, message: Message) -> Option<Reply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send((message, reply_tx)).await.ok()?;
        reply_rx.await.ok()
    }

    pub fn stats(&self) -> &Arc<DropStats> {
        &self.stats
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Moves `engine` into its own task and returns a handle to it.
///
/// The task applies messages one at a time and writes the state to `sink`
/// whenever the debounce deadline passes. It stops when `shutdown` is
/// cancelled or every handle is dropped; a flush still pending at that point
/// is written before the task returns the engine.
pub fn run_engine(
    engine: Engine,
    sink: Arc<dyn StateSink>,
    shutdown: CancellationToken,
) -> (EngineHandle, JoinHandle<Engine>) {
    let (tx, rx) = mpsc::channel(ENGINE_CHANNEL_CAPACITY);
    let handle = EngineHandle {
        tx,
        stats: Arc::clone(engine.stats()),
    };
    let task = tokio::spawn(engine_loop(engine, rx, sink, shutdown));
    (handle, task)
}

async fn engine_loop(
    mut engine: Engine,
    mut rx: mpsc::Receiver<Command>,
    sink: Arc<dyn StateSink>,
    shutdown: CancellationToken,
) -> Engine {
    log::debug!("Engine loop started");
    loop {
        let deadline = engine.flush_deadline();
        tokio::select! {
            _ = shutdown.cancelled() => break,
            command = rx.recv() => match command {
                Some((message, reply)) => {
                    let answer = engine.handle(message);
                    // Caller may have given up waiting.
                    let _ = reply.send(answer);
                }
                None => break,
            },
            _ = sleep_until_deadline(deadline) => {
                if let Some(state) = engine.take_due_flush() {
                    if !write_state(&sink, state).await {
                        engine.retry_flush();
                    }
                }
            }
        }
    }

    if engine.flush_pending() {
        log::info!("Writing pending state before shutdown");
        if let Err(e) = engine.flush_now(sink.as_ref()) {
            log::warn!("Failed to persist state on shutdown: {}", e);
        }
    }
    log::debug!("Engine loop stopped");
    engine
}

/// Returns false when the write failed and should be retried.
async fn write_state(sink: &Arc<dyn StateSink>, state: PersistedState) -> bool {
    let sink = Arc::clone(sink);
    match tokio::task::spawn_blocking(move || sink.persist(&state)).await {
        Ok(Ok(())) => {
            log::debug!("Flushed state");
            true
        }
        Ok(Err(e)) => {
            log::warn!("Failed to persist state, will retry: {}", e);
            false
        }
        Err(e) => {
            log::warn!("State flush task failed, will retry: {}", e);
            false
        }
    }
}
