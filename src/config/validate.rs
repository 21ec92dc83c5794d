// src/config/validate.rs

use crate::config::model::{RawServerConfig, ServerConfig};
use crate::errors::{GoalError, Result};

impl TryFrom<RawServerConfig> for ServerConfig {
    type Error = GoalError;

    fn try_from(raw: RawServerConfig) -> std::result::Result<Self, Self::Error> {
        let config = ServerConfig::new_unchecked(raw.server, raw.logging);
        config.validate()?;
        Ok(config)
    }
}

impl ServerConfig {
    /// Check the invariants the loader enforces.
    ///
    /// `ServerConfig` has public fields, so configs built in code go through
    /// this before anything is spawned from them.
    pub fn validate(&self) -> Result<()> {
        validate_action_name(&self.action_name)?;
        validate_feedback_capacity(self.feedback_capacity)?;
        Ok(())
    }
}

fn validate_action_name(action_name: &str) -> Result<()> {
    let name = action_name.trim();
    if name.is_empty() {
        return Err(GoalError::ConfigError(
            "[server].action_name must not be empty".to_string(),
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(GoalError::ConfigError(format!(
            "[server].action_name must not contain whitespace (got '{}')",
            action_name
        )));
    }
    Ok(())
}

fn validate_feedback_capacity(capacity: usize) -> Result<()> {
    // tokio's bounded channel panics on a zero capacity.
    if capacity == 0 {
        return Err(GoalError::ConfigError(
            "[server].feedback_capacity must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
