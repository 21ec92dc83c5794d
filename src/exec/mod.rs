// src/exec/mod.rs

//! Goal execution layer.
//!
//! - [`executor`] owns the per-goal step loop (`ActionExecutor`).
//! - [`policy`] provides the `GoalPolicy` trait the server is built around,
//!   with the single-goal (preempting) and parallel implementations.

pub mod executor;
pub mod policy;

pub use executor::ActionExecutor;
pub use policy::{policy_for, GoalPolicy, ParallelGoalPolicy, SingleGoalPolicy};
