// src/lib.rs

pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod goal;
pub mod logging;
pub mod sequence;
pub mod types;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ServerConfig;
use crate::engine::{GoalServer, Runtime, ServerClient, ServerEvent};
use crate::errors::Result;
use crate::goal::{ChannelFeedbackSink, FeedbackSink};
use crate::types::Feedback;

/// Capacity of the goal source → runtime event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Run a goal server until shutdown, reading events from `event_rx`.
///
/// This wires together:
/// - executor + policy (from `config`)
/// - goal server
/// - the runtime event loop
pub async fn run(
    config: &ServerConfig,
    event_rx: mpsc::Receiver<ServerEvent>,
    feedback: Arc<dyn FeedbackSink>,
) -> Result<()> {
    let server = GoalServer::from_config(config, feedback);
    Runtime::new(server, event_rx).run().await
}

/// A server running on a background Tokio task.
#[derive(Debug)]
pub struct RunningServer {
    /// Send goal / cancel / shutdown requests here.
    pub client: ServerClient,
    /// Feedback published by executing goals.
    pub feedback: mpsc::Receiver<Feedback>,
    /// Resolves once the runtime has shut down.
    pub task: JoinHandle<Result<()>>,
}

/// Spawn a goal server with a channel-backed feedback sink.
///
/// `config` is validated first; an invalid one (e.g. a zero feedback
/// capacity) is returned as `GoalError::ConfigError` and nothing is spawned.
/// Must be called from within a Tokio runtime.
pub fn spawn(config: ServerConfig) -> Result<RunningServer> {
    config.validate()?;
    let (event_tx, event_rx) = mpsc::channel::<ServerEvent>(EVENT_CHANNEL_CAPACITY);
    let (sink, feedback) = ChannelFeedbackSink::channel(config.feedback_capacity);

    info!(action = %config.action_name, "spawning goal server");
    let task = tokio::spawn(async move { run(&config, event_rx, Arc::new(sink)).await });

    Ok(RunningServer {
        client: ServerClient::new(event_tx),
        feedback,
        task,
    })
}
