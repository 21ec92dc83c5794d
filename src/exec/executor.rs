// src/exec/executor.rs

//! Drives a single goal from `Pending` to a terminal outcome.

use std::time::Duration;

use tracing::{debug, error, info};

use crate::goal::GoalHandle;
use crate::sequence::SequencePrefix;
use crate::types::{GoalOutcome, GoalStatus};

/// Step loop for one goal.
///
/// Each iteration:
/// 1. checks the cancel flag (cancelled goals keep their partial prefix),
/// 2. appends the next element,
/// 3. publishes feedback,
/// 4. suspends for `step_interval` (cut short by a cancel request).
///
/// The executor only *proposes* an outcome; storing it on the handle and
/// clearing any registry slot is the policy's job.
#[derive(Debug, Clone, Copy)]
pub struct ActionExecutor {
    step_interval: Duration,
}

impl ActionExecutor {
    pub fn new(step_interval: Duration) -> Self {
        Self { step_interval }
    }

    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    /// Run `handle` from the `[0, 1]` seed.
    pub async fn run(&self, handle: &GoalHandle) -> GoalOutcome {
        self.run_from(handle, SequencePrefix::seed()).await
    }

    /// Run `handle` starting from an existing prefix.
    pub async fn run_from(&self, handle: &GoalHandle, mut prefix: SequencePrefix) -> GoalOutcome {
        let goal = handle.id();
        let order = handle.requested_order();

        if let Err(err) = handle.set_status(GoalStatus::Executing) {
            error!(goal = %goal, error = %err, "cannot start goal");
            return GoalOutcome::failed(prefix.into_vec(), err.to_string());
        }
        info!(goal = %goal, order, "executing goal");

        loop {
            if handle.is_cancel_requested() {
                info!(goal = %goal, len = prefix.len(), "cancellation observed; stopping");
                return GoalOutcome::cancelled(prefix.into_vec());
            }

            if prefix.is_complete(order) {
                break;
            }

            match prefix.step() {
                Ok(value) => {
                    debug!(goal = %goal, len = prefix.len(), value, "step");
                }
                Err(err) => {
                    error!(goal = %goal, len = prefix.len(), error = %err, "goal failed");
                    return GoalOutcome::failed(prefix.into_vec(), err.to_string());
                }
            }

            handle.publish_feedback(prefix.as_slice());

            if !prefix.is_complete(order) {
                self.suspend(handle).await;
            }
        }

        info!(goal = %goal, len = prefix.len(), "goal ran to completion");
        GoalOutcome::succeeded(prefix.into_vec())
    }

    /// Cooperative suspension point between steps.
    async fn suspend(&self, handle: &GoalHandle) {
        if self.step_interval.is_zero() {
            tokio::task::yield_now().await;
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(self.step_interval) => {}
            _ = handle.cancelled() => {}
        }
    }
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::goal::{ChannelFeedbackSink, NullFeedbackSink};
    use crate::types::GoalId;

    fn goal(order: u32) -> GoalHandle {
        GoalHandle::new(GoalId::new(1), order, Arc::new(NullFeedbackSink)).0
    }

    #[tokio::test]
    async fn runs_to_completion() {
        let executor = ActionExecutor::new(Duration::ZERO);
        let (sink, mut rx) = ChannelFeedbackSink::channel(64);
        let (handle, _c) = GoalHandle::new(GoalId::new(1), 6, Arc::new(sink));

        let outcome = executor.run(&handle).await;
        assert_eq!(outcome, GoalOutcome::succeeded(vec![0, 1, 1, 2, 3, 5]));

        let mut lens = Vec::new();
        while let Ok(fb) = rx.try_recv() {
            lens.push(fb.sequence.len());
        }
        assert_eq!(lens, vec![3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn zero_order_emits_no_feedback() {
        let executor = ActionExecutor::new(Duration::ZERO);
        let (sink, mut rx) = ChannelFeedbackSink::channel(4);
        let (handle, _c) = GoalHandle::new(GoalId::new(1), 0, Arc::new(sink));

        let outcome = executor.run(&handle).await;
        assert_eq!(outcome, GoalOutcome::succeeded(vec![0, 1]));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancel_before_start_returns_seed() {
        let executor = ActionExecutor::new(Duration::ZERO);
        let handle = goal(10);
        handle.request_cancel();

        let outcome = executor.run(&handle).await;
        assert_eq!(outcome, GoalOutcome::cancelled(vec![0, 1]));
    }

    #[tokio::test]
    async fn malformed_prefix_fails_goal() {
        let executor = ActionExecutor::new(Duration::ZERO);
        let handle = goal(5);

        let outcome = executor
            .run_from(&handle, SequencePrefix::from_values(vec![3]))
            .await;
        assert_eq!(outcome.status, GoalStatus::Failed);
        assert_eq!(outcome.sequence, vec![3]);
        assert!(outcome.error.unwrap().contains("invalid sequence state"));
    }

    #[tokio::test]
    async fn overflow_fails_with_partial_prefix() {
        let executor = ActionExecutor::new(Duration::ZERO);
        let handle = goal(200);

        let outcome = executor.run(&handle).await;
        assert_eq!(outcome.status, GoalStatus::Failed);
        assert_eq!(outcome.sequence.len(), 94);
    }

    #[tokio::test]
    async fn running_twice_is_rejected() {
        let executor = ActionExecutor::new(Duration::ZERO);
        let handle = goal(3);
        executor.run(&handle).await;

        let second = executor.run(&handle).await;
        assert_eq!(second.status, GoalStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_cuts_the_step_sleep_short() {
        let executor = ActionExecutor::new(Duration::from_secs(3600));
        let handle = goal(10);

        let task = {
            let handle = handle.clone();
            tokio::spawn(async move { executor.run(&handle).await })
        };
        tokio::task::yield_now().await;
        handle.request_cancel();

        let outcome = task.await.unwrap();
        assert_eq!(outcome.status, GoalStatus::Cancelled);
        assert!(outcome.sequence.len() <= 3);
    }
}
