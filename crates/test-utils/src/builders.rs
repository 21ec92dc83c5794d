use std::time::Duration;

use goalslot::config::ServerConfig;
use goalslot::types::{AdmissionPolicy, LogLevel};

/// Builder for `ServerConfig` to simplify test setup.
///
/// Starts from the defaults but with a zero step interval, so goals finish
/// as fast as the scheduler allows unless a test asks otherwise.
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig {
                step_interval: Duration::ZERO,
                ..ServerConfig::default()
            },
        }
    }

    pub fn action_name(mut self, name: &str) -> Self {
        self.config.action_name = name.to_string();
        self
    }

    pub fn admission(mut self, policy: AdmissionPolicy) -> Self {
        self.config.admission = policy;
        self
    }

    pub fn step_interval(mut self, interval: Duration) -> Self {
        self.config.step_interval = interval;
        self
    }

    pub fn feedback_capacity(mut self, capacity: usize) -> Self {
        self.config.feedback_capacity = capacity;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = Some(level);
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
