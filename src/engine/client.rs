// src/engine/client.rs

use tokio::sync::{mpsc, oneshot};

use crate::errors::{GoalError, Result};
use crate::goal::GoalHandle;
use crate::types::GoalResponse;

use super::{AcceptedGoal, GoalRequest, ServerEvent};

/// Sending half of a [`Runtime`](super::Runtime).
///
/// Cheap to clone; each clone keeps the runtime alive.
#[derive(Debug, Clone)]
pub struct ServerClient {
    tx: mpsc::Sender<ServerEvent>,
}

impl ServerClient {
    pub fn new(tx: mpsc::Sender<ServerEvent>) -> Self {
        Self { tx }
    }

    /// Offer a goal and wait for the admission decision.
    pub async fn submit(&self, order: u32) -> Result<AcceptedGoal> {
        let (reply, rx) = oneshot::channel();
        self.send(ServerEvent::GoalRequested {
            request: GoalRequest { order },
            reply,
        })
        .await?;
        rx.await
            .map_err(|_| GoalError::ChannelClosed("runtime dropped goal reply".to_string()))?
    }

    /// Request cancellation of an accepted goal.
    pub async fn cancel(&self, handle: &GoalHandle) -> Result<GoalResponse> {
        let (reply, rx) = oneshot::channel();
        self.send(ServerEvent::CancelRequested {
            handle: handle.clone(),
            reply,
        })
        .await?;
        rx.await
            .map_err(|_| GoalError::ChannelClosed("runtime dropped cancel reply".to_string()))
    }

    /// Ask the runtime to cancel everything and stop.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(ServerEvent::ShutdownRequested).await
    }

    async fn send(&self, event: ServerEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| GoalError::ChannelClosed("runtime event channel closed".to_string()))
    }
}
