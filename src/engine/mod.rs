// src/engine/mod.rs

//! Goal-serving engine.
//!
//! - [`server`] is the dispatcher-facing facade: it assigns ids, asks the
//!   policy to admit, and spawns execution.
//! - [`runtime`] is the async event loop that feeds [`ServerEvent`]s from a
//!   channel into the server and handles shutdown.
//! - [`client`] is the sending half used by whatever transport delivers goal
//!   and cancel requests.

use tokio::sync::oneshot;

use crate::errors::Result;
use crate::goal::{GoalCompletion, GoalHandle};
use crate::types::GoalResponse;

/// A request to start a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalRequest {
    /// Length bound of the sequence to compute.
    pub order: u32,
}

/// A goal the server admitted.
///
/// `handle` is the cancel-request handle; `completion` resolves to the
/// terminal outcome.
#[derive(Debug)]
pub struct AcceptedGoal {
    pub handle: GoalHandle,
    pub completion: GoalCompletion,
}

/// Events flowing into the runtime from the goal source.
#[derive(Debug)]
pub enum ServerEvent {
    /// Offer a new goal.
    GoalRequested {
        request: GoalRequest,
        reply: oneshot::Sender<Result<AcceptedGoal>>,
    },
    /// External cancel request for an accepted goal.
    CancelRequested {
        handle: GoalHandle,
        reply: oneshot::Sender<GoalResponse>,
    },
    /// Cancel everything, wait for in-flight goals, then stop.
    ShutdownRequested,
}

pub mod client;
pub mod runtime;
pub mod server;

pub use client::ServerClient;
pub use runtime::Runtime;
pub use server::GoalServer;
