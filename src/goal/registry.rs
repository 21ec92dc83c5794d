// src/goal/registry.rs

//! Single-slot goal registry.
//!
//! Holds at most one active [`GoalHandle`]. Admitting a new goal cancels the
//! current holder and installs the newcomer under the same lock
//! acquisition, so two goals are never both considered active.
//!
//! Preemption is optimistic: the evicted goal is only *signalled*. Its
//! executor notices the flag at its next per-step check, which may be after
//! the new goal has started stepping.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::goal::handle::GoalHandle;
use crate::types::{GoalId, GoalOutcome, GoalResponse, GoalStatus};

#[derive(Debug, Default)]
pub struct GoalRegistry {
    slot: Mutex<Option<GoalHandle>>,
}

impl GoalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `handle`, preempting whatever currently holds the slot.
    ///
    /// Always accepts.
    pub fn admit(&self, handle: &GoalHandle) -> GoalResponse {
        let mut slot = self.lock_slot();

        if let Some(previous) = slot.as_ref() {
            if !previous.same_goal(handle) {
                info!(
                    goal = %previous.id(),
                    by = %handle.id(),
                    "preempting active goal"
                );
                previous.request_cancel();
            }
        }

        *slot = Some(handle.clone());
        debug!(goal = %handle.id(), order = handle.requested_order(), "goal installed in slot");
        GoalResponse::Accept
    }

    /// Clear the slot if it still holds `handle`.
    ///
    /// A goal that was already preempted finishes after its replacement was
    /// installed; its release is ignored and `false` is returned.
    pub fn release(&self, handle: &GoalHandle) -> bool {
        let mut slot = self.lock_slot();
        Self::release_locked(&mut slot, handle)
    }

    /// Settle a goal's proposed outcome against the slot and release it.
    ///
    /// A goal whose cancel flag is set by the time it finishes reports
    /// `Cancelled`, whether its loop ran to the end or failed on a step taken
    /// after the flag was raised. The flag is checked under the slot lock,
    /// which `admit` also holds while cancelling, so a goal preempted at any
    /// point before this call always ends `Cancelled`.
    pub fn finish(&self, handle: &GoalHandle, proposed: GoalOutcome) -> GoalOutcome {
        let mut slot = self.lock_slot();

        let outcome = if proposed.status != GoalStatus::Cancelled && handle.is_cancel_requested() {
            debug!(
                goal = %handle.id(),
                proposed = %proposed.status,
                "cancel raced with completion; reporting cancelled"
            );
            GoalOutcome::cancelled(proposed.sequence)
        } else {
            proposed
        };

        Self::release_locked(&mut slot, handle);
        outcome
    }

    /// Decide on an external cancel request. Always accepts.
    pub fn cancel_callback(&self, handle: &GoalHandle) -> GoalResponse {
        debug!(goal = %handle.id(), "cancel request accepted");
        GoalResponse::Accept
    }

    /// Id of the goal currently holding the slot.
    pub fn active(&self) -> Option<GoalId> {
        self.lock_slot().as_ref().map(GoalHandle::id)
    }

    /// Clone of the handle currently holding the slot.
    pub fn active_handle(&self) -> Option<GoalHandle> {
        self.lock_slot().clone()
    }

    fn release_locked(slot: &mut Option<GoalHandle>, handle: &GoalHandle) -> bool {
        match slot.as_ref() {
            Some(current) if current.same_goal(handle) => {
                *slot = None;
                debug!(goal = %handle.id(), "slot released");
                true
            }
            Some(current) => {
                debug!(
                    goal = %handle.id(),
                    active = %current.id(),
                    "stale release ignored"
                );
                false
            }
            None => {
                debug!(goal = %handle.id(), "release on empty slot ignored");
                false
            }
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<GoalHandle>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
