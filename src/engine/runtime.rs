// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;

use super::{GoalServer, ServerEvent};

/// Drives a [`GoalServer`] in response to [`ServerEvent`]s.
///
/// This is the async shell around the server: it reads events from the goal
/// source channel, dispatches them, and performs the shutdown sequence.
pub struct Runtime {
    server: GoalServer,
    event_rx: mpsc::Receiver<ServerEvent>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(server: GoalServer, event_rx: mpsc::Receiver<ServerEvent>) -> Self {
        Self { server, event_rx }
    }

    /// Main event loop.
    ///
    /// Runs until `ShutdownRequested` arrives or every sender is dropped;
    /// either way, active goals are cancelled and awaited before returning.
    pub async fn run(mut self) -> Result<()> {
        info!(action = %self.server.action_name(), "goal runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            if !self.handle_event(event) {
                info!("shutdown requested; stopping runtime");
                break;
            }
        }

        self.server.shutdown().await;
        info!("runtime exiting");
        Ok(())
    }

    /// Returns `false` when the loop should stop.
    fn handle_event(&mut self, event: ServerEvent) -> bool {
        match event {
            ServerEvent::GoalRequested { request, reply } => {
                let accepted = self.server.submit(request);
                if reply.send(accepted).is_err() {
                    // Requester went away; the goal still runs to completion.
                    debug!("goal requester dropped before reply");
                }
                true
            }
            ServerEvent::CancelRequested { handle, reply } => {
                let decision = self.server.cancel(&handle);
                let _ = reply.send(decision);
                true
            }
            ServerEvent::ShutdownRequested => false,
        }
    }
}
