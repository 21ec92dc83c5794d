// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::{AdmissionPolicy, LogLevel};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [server]
/// action_name = "fibonacci"
/// admission = "preempt"
/// step_interval_ms = 1000
/// feedback_capacity = 16
///
/// [logging]
/// level = "info"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Name the action is served under. Only used for logging here; the
    /// transport layer owns naming.
    #[serde(default = "default_action_name")]
    pub action_name: String,

    /// `"preempt"` (default) or `"parallel"`.
    #[serde(default)]
    pub admission: AdmissionPolicy,

    /// Delay between two steps of a goal, in milliseconds.
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,

    /// Capacity of the feedback channel. Updates beyond it are dropped.
    #[serde(default = "default_feedback_capacity")]
    pub feedback_capacity: usize,
}

fn default_action_name() -> String {
    "fibonacci".to_string()
}

fn default_step_interval_ms() -> u64 {
    1000
}

fn default_feedback_capacity() -> usize {
    16
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            action_name: default_action_name(),
            admission: AdmissionPolicy::default(),
            step_interval_ms: default_step_interval_ms(),
            feedback_capacity: default_feedback_capacity(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingSection {
    /// If `None`, `GOALSLOT_LOG` or `info` is used. Applied by
    /// `logging::init_logging_from_config`; the server itself never installs
    /// a subscriber.
    #[serde(default)]
    pub level: Option<LogLevel>,
}

/// Validated configuration.
///
/// Obtained through `ServerConfig::try_from(raw)` or the loader helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub action_name: String,
    pub admission: AdmissionPolicy,
    pub step_interval: Duration,
    pub feedback_capacity: usize,
    pub log_level: Option<LogLevel>,
}

impl ServerConfig {
    pub(crate) fn new_unchecked(server: ServerSection, logging: LoggingSection) -> Self {
        Self {
            action_name: server.action_name,
            admission: server.admission,
            step_interval: Duration::from_millis(server.step_interval_ms),
            feedback_capacity: server.feedback_capacity,
            log_level: logging.level,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new_unchecked(ServerSection::default(), LoggingSection::default())
    }
}
