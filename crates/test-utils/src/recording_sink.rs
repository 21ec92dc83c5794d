use std::sync::{Arc, Mutex};

use goalslot::goal::FeedbackSink;
use goalslot::types::{Feedback, GoalId};
use tokio::sync::Notify;

/// A feedback sink that:
/// - records every update it receives, in order
/// - wakes waiters whenever a new update arrives.
#[derive(Clone, Default)]
pub struct RecordingFeedbackSink {
    received: Arc<Mutex<Vec<Feedback>>>,
    notify: Arc<Notify>,
}

impl RecordingFeedbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Feedback> {
        self.received.lock().unwrap().clone()
    }

    /// Feedback published for one goal, in publication order.
    pub fn for_goal(&self, goal: GoalId) -> Vec<Vec<u64>> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.goal_id == goal)
            .map(|f| f.sequence.clone())
            .collect()
    }

    pub fn count_for(&self, goal: GoalId) -> usize {
        self.for_goal(goal).len()
    }

    /// Wait until `goal` has published at least `n` updates.
    pub async fn wait_for_count(&self, goal: GoalId, n: usize) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.count_for(goal) >= n {
                return;
            }
            notified.await;
        }
    }
}

impl FeedbackSink for RecordingFeedbackSink {
    fn send(&self, feedback: Feedback) {
        self.received.lock().unwrap().push(feedback);
        self.notify.notify_waiters();
    }
}
