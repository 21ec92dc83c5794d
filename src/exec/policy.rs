// src/exec/policy.rs

//! Pluggable goal policy.
//!
//! The server talks to a `GoalPolicy` instead of wiring admission, cancel
//! and execute callbacks by hand. The policy is picked once, at
//! construction, from [`AdmissionPolicy`]:
//!
//! - [`SingleGoalPolicy`] keeps one active goal in a [`GoalRegistry`] and
//!   preempts it when a new goal is admitted.
//! - [`ParallelGoalPolicy`] accepts everything and lets goals run side by
//!   side.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::goal::{GoalHandle, GoalRegistry};
use crate::types::{AdmissionPolicy, GoalId, GoalOutcome, GoalResponse};

use super::executor::ActionExecutor;

/// Capability set a goal server is built around.
pub trait GoalPolicy: Send + Sync {
    /// Decide whether to accept a freshly created goal.
    fn admit(&self, handle: &GoalHandle) -> GoalResponse;

    /// Decide whether to honour an external cancel request.
    fn cancel_callback(&self, handle: &GoalHandle) -> GoalResponse;

    /// Drive an admitted goal to its terminal outcome.
    ///
    /// The returned outcome has already been stored on the handle.
    fn execute(
        &self,
        handle: GoalHandle,
    ) -> Pin<Box<dyn Future<Output = GoalOutcome> + Send + '_>>;

    /// Goals currently considered active.
    fn active_goals(&self) -> Vec<GoalId>;

    /// Request cancellation of every active goal. Returns how many were
    /// signalled.
    fn cancel_all(&self) -> usize;
}

/// Build the policy selected in configuration.
pub fn policy_for(kind: AdmissionPolicy, executor: ActionExecutor) -> Arc<dyn GoalPolicy> {
    match kind {
        AdmissionPolicy::Preempt => Arc::new(SingleGoalPolicy::new(executor)),
        AdmissionPolicy::Parallel => Arc::new(ParallelGoalPolicy::new(executor)),
    }
}

/// Store `outcome` on the handle, logging instead of failing if that is
/// not possible (e.g. the result was already set).
fn deliver(handle: &GoalHandle, outcome: GoalOutcome) -> GoalOutcome {
    info!(
        goal = %handle.id(),
        status = %outcome.status,
        len = outcome.sequence.len(),
        "goal finished"
    );
    if let Err(err) = handle.set_result(outcome.clone()) {
        warn!(goal = %handle.id(), error = %err, "could not record terminal result");
    }
    outcome
}

/// One goal at a time; newcomers preempt the current holder.
#[derive(Debug)]
pub struct SingleGoalPolicy {
    registry: GoalRegistry,
    executor: ActionExecutor,
}

impl SingleGoalPolicy {
    pub fn new(executor: ActionExecutor) -> Self {
        Self {
            registry: GoalRegistry::new(),
            executor,
        }
    }

    pub fn registry(&self) -> &GoalRegistry {
        &self.registry
    }
}

impl GoalPolicy for SingleGoalPolicy {
    fn admit(&self, handle: &GoalHandle) -> GoalResponse {
        self.registry.admit(handle)
    }

    fn cancel_callback(&self, handle: &GoalHandle) -> GoalResponse {
        self.registry.cancel_callback(handle)
    }

    fn execute(
        &self,
        handle: GoalHandle,
    ) -> Pin<Box<dyn Future<Output = GoalOutcome> + Send + '_>> {
        Box::pin(async move {
            let proposed = self.executor.run(&handle).await;
            let settled = self.registry.finish(&handle, proposed);
            deliver(&handle, settled)
        })
    }

    fn active_goals(&self) -> Vec<GoalId> {
        self.registry.active().into_iter().collect()
    }

    fn cancel_all(&self) -> usize {
        match self.registry.active_handle() {
            Some(handle) => usize::from(handle.request_cancel()),
            None => 0,
        }
    }
}

/// Every goal is accepted and runs independently.
#[derive(Debug)]
pub struct ParallelGoalPolicy {
    running: Mutex<Vec<GoalHandle>>,
    executor: ActionExecutor,
}

impl ParallelGoalPolicy {
    pub fn new(executor: ActionExecutor) -> Self {
        Self {
            running: Mutex::new(Vec::new()),
            executor,
        }
    }

    fn lock_running(&self) -> MutexGuard<'_, Vec<GoalHandle>> {
        self.running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GoalPolicy for ParallelGoalPolicy {
    fn admit(&self, handle: &GoalHandle) -> GoalResponse {
        self.lock_running().push(handle.clone());
        GoalResponse::Accept
    }

    fn cancel_callback(&self, _handle: &GoalHandle) -> GoalResponse {
        GoalResponse::Accept
    }

    fn execute(
        &self,
        handle: GoalHandle,
    ) -> Pin<Box<dyn Future<Output = GoalOutcome> + Send + '_>> {
        Box::pin(async move {
            let outcome = self.executor.run(&handle).await;
            self.lock_running().retain(|h| !h.same_goal(&handle));
            deliver(&handle, outcome)
        })
    }

    fn active_goals(&self) -> Vec<GoalId> {
        self.lock_running().iter().map(GoalHandle::id).collect()
    }

    fn cancel_all(&self) -> usize {
        self.lock_running()
            .iter()
            .filter(|h| h.request_cancel())
            .count()
    }
}
