//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `plantrigger.toml` in the working directory, or at the path in
//! `PLANTRIGGER_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use std::collections::HashSet;
use std::time::Duration;

use plantrigger_domain::id::TriggerId;
use plantrigger_domain::payload::Payload;
use plantrigger_domain::trigger::{TriggerDefinition, TriggerKind};
use serde::Deserialize;

const DEFAULT_PATH: &str = "plantrigger.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    /// The virtual SEV and the ramp driving it.
    pub signal: SignalConfig,
    pub dispatcher: DispatcherConfig,
    pub triggers: Vec<TriggerDefinition>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Virtual signal and ramp.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub name: String,
    /// Value before the first step; relative triggers use it as reference.
    pub start: f64,
    /// Added to the signal on every step.
    pub step: f64,
    pub period_ms: u64,
    /// Number of steps before the ramp ends.
    pub samples: u32,
}

/// Simulated payload dispatcher.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// How long each payload "runs".
    pub duration_ms: u64,
    /// Payload kinds whose dispatch fails.
    pub failing_kinds: Vec<String>,
    /// Grace period after the ramp for in-flight payloads to complete.
    pub drain_ms: u64,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is malformed, if an explicitly
    /// requested file cannot be read, or if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("PLANTRIGGER_CONFIG") {
            Ok(path) => Self::from_path(&path)?,
            Err(_) => Self::from_file(DEFAULT_PATH)?,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Like [`from_file`](Self::from_file) but a missing file is an error.
    fn from_path(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PLANTRIGGER_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.signal.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "signal name must not be empty".to_string(),
            ));
        }
        if !self.signal.start.is_finite() || !self.signal.step.is_finite() {
            return Err(ConfigError::Validation(
                "signal start and step must be finite numbers".to_string(),
            ));
        }
        if self.signal.period_ms == 0 {
            return Err(ConfigError::Validation(
                "signal period_ms must be non-zero".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for trigger in &self.triggers {
            trigger.validate().map_err(|err| {
                ConfigError::Validation(format!("trigger '{}': {}", trigger.name, source_message(&err)))
            })?;
            if !names.insert(trigger.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate trigger name '{}'",
                    trigger.name
                )));
            }
        }
        Ok(())
    }
}

/// The innermost message of an error chain, e.g. "repeating interval must be
/// greater than zero, got 0" rather than "Validation error".
fn source_message(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

impl SignalConfig {
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl DispatcherConfig {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    #[must_use]
    pub fn drain(&self) -> Duration {
        Duration::from_millis(self.drain_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            signal: SignalConfig::default(),
            dispatcher: DispatcherConfig::default(),
            triggers: default_triggers(),
        }
    }
}

/// A repeating scan and a one-off snapshot, so the daemon does something
/// useful without a config file.
fn default_triggers() -> Vec<TriggerDefinition> {
    vec![
        TriggerDefinition {
            id: TriggerId::new(),
            name: "scan every 1.0".to_string(),
            condition: TriggerKind::Repeating { interval: 1.0 },
            payload: Payload::new("scan", serde_json::json!({ "points": 5 })),
        },
        TriggerDefinition {
            id: TriggerId::new(),
            name: "snapshot at 5.0".to_string(),
            condition: TriggerKind::SingleShot {
                target: 5.0,
                tolerance: 0.25,
            },
            payload: Payload::new("snapshot", serde_json::Value::Null),
        },
    ]
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "plantriggerd=info,plantrigger_app=info,plantrigger_adapter_virtual=info"
                .to_string(),
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            name: "temperature".to_string(),
            start: 0.0,
            step: 0.25,
            period_ms: 100,
            samples: 24,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            duration_ms: 50,
            failing_kinds: Vec::new(),
            drain_ms: 1000,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
