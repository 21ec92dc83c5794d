// src/goal/handle.rs

//! A single accepted goal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{oneshot, Notify};
use tracing::debug;

use crate::errors::{GoalError, Result};
use crate::goal::feedback::FeedbackSink;
use crate::types::{Feedback, GoalId, GoalOutcome, GoalStatus};

/// Shared handle to one accepted goal.
///
/// Clones refer to the same goal: the registry keeps one in its slot, the
/// executor drives another, and the dispatcher keeps a third to forward
/// external cancel requests.
#[derive(Clone)]
pub struct GoalHandle {
    inner: Arc<Inner>,
}

struct Inner {
    id: GoalId,
    order: u32,
    cancel_requested: AtomicBool,
    cancel_notify: Notify,
    feedback: Arc<dyn FeedbackSink>,
    state: Mutex<HandleState>,
}

struct HandleState {
    status: GoalStatus,
    result: Option<GoalOutcome>,
    result_tx: Option<oneshot::Sender<GoalOutcome>>,
}

impl fmt::Debug for GoalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoalHandle")
            .field("id", &self.inner.id)
            .field("order", &self.inner.order)
            .field("cancel_requested", &self.is_cancel_requested())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl GoalHandle {
    /// Create a pending goal and the future that resolves to its terminal
    /// outcome.
    pub fn new(
        id: GoalId,
        order: u32,
        feedback: Arc<dyn FeedbackSink>,
    ) -> (Self, GoalCompletion) {
        let (tx, rx) = oneshot::channel();
        let handle = Self {
            inner: Arc::new(Inner {
                id,
                order,
                cancel_requested: AtomicBool::new(false),
                cancel_notify: Notify::new(),
                feedback,
                state: Mutex::new(HandleState {
                    status: GoalStatus::Pending,
                    result: None,
                    result_tx: Some(tx),
                }),
            }),
        };
        (handle, GoalCompletion { id, rx })
    }

    pub fn id(&self) -> GoalId {
        self.inner.id
    }

    pub fn requested_order(&self) -> u32 {
        self.inner.order
    }

    /// True if both handles refer to the same goal.
    pub fn same_goal(&self, other: &GoalHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Set the cancel flag.
    ///
    /// Returns `true` for the call that flipped it; later calls are no-ops.
    pub fn request_cancel(&self) -> bool {
        let flipped = self
            .inner
            .cancel_requested
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if flipped {
            debug!(goal = %self.inner.id, "cancel requested");
            self.inner.cancel_notify.notify_waiters();
        }
        flipped
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel_requested.load(Ordering::Acquire)
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.cancel_notify.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent `request_cancel`
            // cannot slip between the check and the await.
            notified.as_mut().enable();

            if self.is_cancel_requested() {
                return;
            }
            notified.await;
        }
    }

    /// Forward the current prefix to the feedback sink.
    pub fn publish_feedback(&self, sequence: &[u64]) {
        self.inner.feedback.send(Feedback {
            goal_id: self.inner.id,
            sequence: sequence.to_vec(),
        });
    }

    pub fn status(&self) -> GoalStatus {
        self.lock_state().status
    }

    /// Terminal outcome, once one has been set.
    pub fn result(&self) -> Option<GoalOutcome> {
        self.lock_state().result.clone()
    }

    /// Move the goal to a non-terminal status (`Executing`).
    ///
    /// Terminal statuses go through [`GoalHandle::set_result`].
    pub fn set_status(&self, next: GoalStatus) -> Result<()> {
        let mut state = self.lock_state();
        self.transition(&mut state, next)
    }

    /// Store the terminal outcome and deliver it to the waiting
    /// [`GoalCompletion`]. Succeeds at most once per handle.
    pub fn set_result(&self, outcome: GoalOutcome) -> Result<()> {
        let mut state = self.lock_state();

        if state.result.is_some() {
            return Err(GoalError::ResultAlreadySet(self.inner.id));
        }
        self.transition(&mut state, outcome.status)?;

        state.result = Some(outcome.clone());
        if let Some(tx) = state.result_tx.take() {
            if tx.send(outcome).is_err() {
                debug!(goal = %self.inner.id, "completion receiver dropped; result not delivered");
            }
        }
        Ok(())
    }

    fn transition(&self, state: &mut HandleState, next: GoalStatus) -> Result<()> {
        if !state.status.can_transition_to(next) {
            return Err(GoalError::InvalidTransition {
                goal: self.inner.id,
                from: state.status,
                to: next,
            });
        }
        state.status = next;
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, HandleState> {
        // Every update is a single field store; poisoned state is still valid.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Future side of a goal's terminal result.
#[derive(Debug)]
pub struct GoalCompletion {
    id: GoalId,
    rx: oneshot::Receiver<GoalOutcome>,
}

impl GoalCompletion {
    pub fn id(&self) -> GoalId {
        self.id
    }

    /// Wait for the terminal outcome.
    pub async fn wait(self) -> Result<GoalOutcome> {
        self.rx.await.map_err(|_| {
            GoalError::ChannelClosed(format!("{} dropped without a terminal result", self.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::feedback::{ChannelFeedbackSink, NullFeedbackSink};
    use std::time::Duration;

    fn handle(order: u32) -> (GoalHandle, GoalCompletion) {
        GoalHandle::new(GoalId::new(1), order, Arc::new(NullFeedbackSink))
    }

    #[test]
    fn request_cancel_is_idempotent() {
        let (h, _c) = handle(5);
        assert!(!h.is_cancel_requested());
        assert!(h.request_cancel());
        assert!(!h.request_cancel());
        assert!(h.is_cancel_requested());
    }

    #[test]
    fn clones_share_the_cancel_flag() {
        let (h, _c) = handle(5);
        let other = h.clone();
        other.request_cancel();
        assert!(h.is_cancel_requested());
        assert!(h.same_goal(&other));
    }

    #[tokio::test]
    async fn result_is_set_once_and_delivered() {
        let (h, completion) = handle(3);
        h.set_status(GoalStatus::Executing).unwrap();
        h.set_result(GoalOutcome::succeeded(vec![0, 1, 1])).unwrap();

        let again = h.set_result(GoalOutcome::cancelled(vec![0, 1]));
        assert!(matches!(again, Err(GoalError::ResultAlreadySet(_))));
        assert_eq!(h.status(), GoalStatus::Succeeded);

        let outcome = completion.wait().await.unwrap();
        assert_eq!(outcome, GoalOutcome::succeeded(vec![0, 1, 1]));
    }

    #[test]
    fn pending_goal_cannot_succeed_directly() {
        let (h, _c) = handle(3);
        let err = h.set_result(GoalOutcome::succeeded(vec![0, 1])).unwrap_err();
        assert!(matches!(err, GoalError::InvalidTransition { .. }));
        assert!(h.result().is_none());
    }

    #[tokio::test]
    async fn dropped_handle_closes_completion() {
        let (h, completion) = handle(3);
        drop(h);
        assert!(matches!(
            completion.wait().await,
            Err(GoalError::ChannelClosed(_))
        ));
    }

    #[tokio::test]
    async fn cancelled_wakes_on_request() {
        let (h, _c) = handle(3);
        let waiter = {
            let h = h.clone();
            tokio::spawn(async move { h.cancelled().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.request_cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancelled() did not resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn feedback_carries_goal_id() {
        let (sink, mut rx) = ChannelFeedbackSink::channel(4);
        let (h, _c) = GoalHandle::new(GoalId::new(9), 4, Arc::new(sink));
        h.publish_feedback(&[0, 1, 1]);

        let fb = rx.recv().await.unwrap();
        assert_eq!(fb.goal_id, GoalId::new(9));
        assert_eq!(fb.sequence, vec![0, 1, 1]);
    }
}
