// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawServerConfig, ServerConfig};
use crate::errors::Result;

/// Load a configuration file and return the raw `RawServerConfig`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for the
/// checked `ServerConfig`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawServerConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawServerConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ServerConfig> {
    let raw = load_from_path(path)?;
    ServerConfig::try_from(raw)
}

/// Same as [`load_and_validate`] for an in-memory TOML string.
pub fn parse_and_validate(contents: &str) -> Result<ServerConfig> {
    let raw: RawServerConfig = toml::from_str(contents)?;
    ServerConfig::try_from(raw)
}

/// Default config location: `Goalslot.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Goalslot.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::types::{AdmissionPolicy, LogLevel};

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = parse_and_validate("").unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.step_interval, Duration::from_secs(1));
        assert_eq!(cfg.admission, AdmissionPolicy::Preempt);
    }

    #[test]
    fn full_document_is_parsed() {
        let cfg = parse_and_validate(
            r#"
[server]
action_name = "fib"
admission = "parallel"
step_interval_ms = 5
feedback_capacity = 2

[logging]
level = "debug"
"#,
        )
        .unwrap();

        assert_eq!(cfg.action_name, "fib");
        assert_eq!(cfg.admission, AdmissionPolicy::Parallel);
        assert_eq!(cfg.step_interval, Duration::from_millis(5));
        assert_eq!(cfg.feedback_capacity, 2);
        assert_eq!(cfg.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn unknown_admission_is_a_toml_error() {
        let err = parse_and_validate("[server]\nadmission = \"queue\"\n").unwrap_err();
        assert!(matches!(err, crate::errors::GoalError::TomlError(_)));
    }

    #[test]
    fn default_path_is_relative() {
        assert_eq!(default_config_path(), PathBuf::from("Goalslot.toml"));
    }
}
