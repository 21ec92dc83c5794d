// src/goal/mod.rs

//! Goal bookkeeping.
//!
//! - [`handle`] holds one accepted goal: its order, cancel flag, feedback
//!   sink and terminal result.
//! - [`registry`] owns the single active-goal slot and implements
//!   preemption.
//! - [`feedback`] defines the progress sink interface and its channel
//!   implementation.

pub mod feedback;
pub mod handle;
pub mod registry;

pub use feedback::{ChannelFeedbackSink, FeedbackSink, NullFeedbackSink};
pub use handle::{GoalCompletion, GoalHandle};
pub use registry::GoalRegistry;
