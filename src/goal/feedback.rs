// src/goal/feedback.rs

//! Feedback sinks.
//!
//! Executors publish a [`Feedback`] after every step. Delivery is
//! fire-and-forget: a sink must never make the executor wait.

use tokio::sync::mpsc;
use tracing::debug;

use crate::types::Feedback;

/// Consumer of incremental progress updates.
pub trait FeedbackSink: Send + Sync {
    fn send(&self, feedback: Feedback);
}

/// Bounded-channel sink.
///
/// Uses `try_send`, so a slow or absent consumer causes updates to be
/// dropped rather than stalling goal execution.
#[derive(Debug, Clone)]
pub struct ChannelFeedbackSink {
    tx: mpsc::Sender<Feedback>,
}

impl ChannelFeedbackSink {
    pub fn new(tx: mpsc::Sender<Feedback>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving half.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Feedback>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl FeedbackSink for ChannelFeedbackSink {
    fn send(&self, feedback: Feedback) {
        if let Err(err) = self.tx.try_send(feedback) {
            let (reason, fb) = match err {
                mpsc::error::TrySendError::Full(fb) => ("channel full", fb),
                mpsc::error::TrySendError::Closed(fb) => ("channel closed", fb),
            };
            debug!(
                goal = %fb.goal_id,
                len = fb.sequence.len(),
                reason,
                "dropping feedback"
            );
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedbackSink;

impl FeedbackSink for NullFeedbackSink {
    fn send(&self, _feedback: Feedback) {}
}
