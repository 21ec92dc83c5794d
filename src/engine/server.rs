// src/engine/server.rs

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::errors::{GoalError, Result};
use crate::exec::{policy_for, ActionExecutor, GoalPolicy};
use crate::goal::{FeedbackSink, GoalHandle};
use crate::types::{GoalId, GoalOutcome, GoalResponse};

use super::{AcceptedGoal, GoalRequest};

/// Accepts goals, hands them to the policy, and runs each one on its own
/// Tokio task.
///
/// Must be used from within a Tokio runtime.
pub struct GoalServer {
    action_name: String,
    policy: Arc<dyn GoalPolicy>,
    feedback: Arc<dyn FeedbackSink>,
    next_id: AtomicU64,
    in_flight: Mutex<JoinSet<GoalOutcome>>,
}

impl fmt::Debug for GoalServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoalServer")
            .field("action_name", &self.action_name)
            .field("active", &self.policy.active_goals())
            .finish_non_exhaustive()
    }
}

impl GoalServer {
    pub fn new(
        action_name: impl Into<String>,
        policy: Arc<dyn GoalPolicy>,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Self {
        Self {
            action_name: action_name.into(),
            policy,
            feedback,
            next_id: AtomicU64::new(0),
            in_flight: Mutex::new(JoinSet::new()),
        }
    }

    /// Build the executor and policy described by `config`.
    pub fn from_config(config: &ServerConfig, feedback: Arc<dyn FeedbackSink>) -> Self {
        let executor = ActionExecutor::new(config.step_interval);
        let policy = policy_for(config.admission, executor);
        info!(
            action = %config.action_name,
            admission = ?config.admission,
            step_interval_ms = config.step_interval.as_millis() as u64,
            "goal server configured"
        );
        Self::new(config.action_name.clone(), policy, feedback)
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    /// Offer a new goal to the policy and start executing it if accepted.
    pub fn submit(&self, request: GoalRequest) -> Result<AcceptedGoal> {
        let id = GoalId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let (handle, completion) =
            GoalHandle::new(id, request.order, Arc::clone(&self.feedback));

        if self.policy.admit(&handle) == GoalResponse::Reject {
            info!(action = %self.action_name, goal = %id, "goal rejected");
            return Err(GoalError::Rejected(id));
        }
        info!(
            action = %self.action_name,
            goal = %id,
            order = request.order,
            "goal accepted"
        );

        let policy = Arc::clone(&self.policy);
        let exec_handle = handle.clone();
        {
            let mut in_flight = self.lock_in_flight();
            while let Some(done) = in_flight.try_join_next() {
                log_join(done);
            }
            in_flight.spawn(async move { policy.execute(exec_handle).await });
        }

        Ok(AcceptedGoal { handle, completion })
    }

    /// Forward an external cancel request, if the policy accepts it.
    pub fn cancel(&self, handle: &GoalHandle) -> GoalResponse {
        let decision = self.policy.cancel_callback(handle);
        if decision == GoalResponse::Accept {
            handle.request_cancel();
        } else {
            debug!(goal = %handle.id(), "cancel request rejected");
        }
        decision
    }

    pub fn active_goals(&self) -> Vec<GoalId> {
        self.policy.active_goals()
    }

    /// Cancel every active goal and wait for all spawned executions.
    ///
    /// Returns the number of goals that were signalled.
    pub async fn shutdown(&self) -> usize {
        let signalled = self.policy.cancel_all();
        info!(action = %self.action_name, signalled, "shutting down goal server");

        let mut in_flight = std::mem::take(&mut *self.lock_in_flight());
        while let Some(done) = in_flight.join_next().await {
            log_join(done);
        }
        signalled
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, JoinSet<GoalOutcome>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn log_join(done: std::result::Result<GoalOutcome, tokio::task::JoinError>) {
    match done {
        Ok(outcome) => debug!(status = %outcome.status, "execution task joined"),
        Err(err) => warn!(error = %err, "goal execution task aborted"),
    }
}
