// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::sequence::SequenceError;
use crate::types::{GoalId, GoalStatus};

#[derive(Error, Debug)]
pub enum GoalError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Terminal result already set for {0}")]
    ResultAlreadySet(GoalId),

    #[error("Goal rejected: {0}")]
    Rejected(GoalId),

    #[error("Invalid status transition for {goal}: {from} -> {to}")]
    InvalidTransition {
        goal: GoalId,
        from: GoalStatus,
        to: GoalStatus,
    },

    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GoalError>;
