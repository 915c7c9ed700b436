//! # Tokio Runtime Adapter
//!
//! Runs a [`DvEngine`] on its own task. Inbound events and control calls
//! arrive over a bounded channel and are applied one at a time, so the
//! engine's single-threaded contract holds; the task sleeps until the next
//! timer deadline in between.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::RoutingTable;
use crate::error::{DvError, TransportError};
use crate::ports::{DvTransport, FibEntry, InboundEvent};
use crate::service::DvEngine;

/// Command queue depth.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Wake-up period when no timer is armed.
const IDLE_WAKE_SECS: u64 = 1;

enum Command {
    Event(InboundEvent),
    Announce {
        prefix: String,
        reply: oneshot::Sender<Result<u64, DvError>>,
    },
    Withdraw {
        prefix: String,
        reply: oneshot::Sender<bool>,
    },
    Table(oneshot::Sender<RoutingTable>),
    Fib(oneshot::Sender<Vec<FibEntry>>),
    Shutdown,
}

/// Handle to an engine running on a tokio task.
pub struct EngineRunner<T: DvTransport + 'static> {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<DvEngine<T>>,
}

impl<T: DvTransport + 'static> EngineRunner<T> {
    /// Start `engine` and spawn its event loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(engine: DvEngine<T>) -> Result<Self, DvError> {
        Self::with_capacity(engine, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(mut engine: DvEngine<T>, capacity: usize) -> Result<Self, DvError> {
        engine.start()?;
        let (commands, receiver) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(engine, receiver));
        Ok(Self { commands, task })
    }

    /// Queue an inbound event.
    pub async fn deliver(&self, event: InboundEvent) -> Result<(), DvError> {
        self.send(Command::Event(event)).await
    }

    pub async fn routing_table(&self) -> Result<RoutingTable, DvError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Table(reply)).await?;
        response.await.map_err(|_| closed())
    }

    pub async fn fib_entries(&self) -> Result<Vec<FibEntry>, DvError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Fib(reply)).await?;
        response.await.map_err(|_| closed())
    }

    pub async fn announce_prefix(&self, prefix: &str) -> Result<u64, DvError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Announce {
            prefix: prefix.to_string(),
            reply,
        })
        .await?;
        response.await.map_err(|_| closed())?
    }

    pub async fn withdraw_prefix(&self, prefix: &str) -> Result<bool, DvError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Withdraw {
            prefix: prefix.to_string(),
            reply,
        })
        .await?;
        response.await.map_err(|_| closed())
    }

    /// Stop the loop and hand the (stopped) engine back.
    pub async fn shutdown(self) -> Result<DvEngine<T>, DvError> {
        // A closed channel means the loop already exited.
        let _ = self.commands.send(Command::Shutdown).await;
        self.task.await.map_err(|_| closed())
    }

    async fn send(&self, command: Command) -> Result<(), DvError> {
        self.commands.send(command).await.map_err(|_| closed())
    }
}

fn closed() -> DvError {
    DvError::Transport(TransportError::Closed)
}

async fn run<T: DvTransport>(
    mut engine: DvEngine<T>,
    mut commands: mpsc::Receiver<Command>,
) -> DvEngine<T> {
    info!(router = %engine.router_prefix(), "routing engine loop running");
    loop {
        engine.run_due_timers();
        let wait_secs = match engine.next_deadline() {
            Some(deadline) => deadline.secs_since(engine.now()),
            None => IDLE_WAKE_SECS,
        };

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => apply(&mut engine, command),
            },
            _ = tokio::time::sleep(Duration::from_secs(wait_secs)) => {}
        }
    }

    engine.stop();
    debug!(router = %engine.router_prefix(), "routing engine loop exited");
    engine
}

fn apply<T: DvTransport>(engine: &mut DvEngine<T>, command: Command) {
    // A dropped reply receiver only means the caller stopped waiting.
    match command {
        Command::Event(event) => engine.handle(event),
        Command::Announce { prefix, reply } => {
            let _ = reply.send(engine.announce_prefix(&prefix));
        }
        Command::Withdraw { prefix, reply } => {
            let _ = reply.send(engine.withdraw_prefix(&prefix));
        }
        Command::Table(reply) => {
            let _ = reply.send(engine.table().clone());
        }
        Command::Fib(reply) => {
            let _ = reply.send(engine.fib_entries());
        }
        Command::Shutdown => {}
    }
}
