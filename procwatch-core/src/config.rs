pub mod loader;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use loader::ConfigLoader;

pub const DEFAULT_HEALTH_CHECK_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// One supervised process. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSpec {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub pause_ms: u64,
    pub port: u16,
}

impl ProcessSpec {
    pub fn new(name: impl Into<String>, command: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            pause_ms: 0,
            port,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn with_pause_ms(mut self, pause_ms: u64) -> Self {
        self.pause_ms = pause_ms;
        self
    }

    pub fn stagger_delay(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessSpecRaw {
    name: String,
    command: String,
    #[serde(default)]
    args: Option<Vec<String>>,
    #[serde(default)]
    pause_ms: u64,
    port: u16,
}

impl<'de> Deserialize<'de> for ProcessSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        ProcessSpecRaw::deserialize(deserializer).map(Into::into)
    }
}

impl From<ProcessSpecRaw> for ProcessSpec {
    fn from(raw: ProcessSpecRaw) -> Self {
        // Without explicit args, "python3 -m http.server" style commands are split
        let (command, args) = match raw.args {
            Some(args) => (raw.command, args),
            None if raw.command.trim().contains(char::is_whitespace) => {
                match shell_words::split(&raw.command) {
                    Ok(parts) if !parts.is_empty() => {
                        let mut parts = parts.into_iter();
                        let command = parts.next().unwrap_or_default();
                        (command, parts.collect())
                    }
                    _ => (raw.command, Vec::new()),
                }
            }
            None => (raw.command, Vec::new()),
        };

        ProcessSpec {
            name: raw.name,
            command,
            args,
            pause_ms: raw.pause_ms,
            port: raw.port,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        })
    }
}

impl FromStr for LogLevel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(crate::Error::Config(format!(
                "unknown log level '{}' (expected DEBUG, INFO or ERROR)",
                other
            ))),
        }
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Optional restart backoff. Absent from the config means restarts are immediate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackoffConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 100,
            max_delay_ms: 30000,
            multiplier: 2.0,
            jitter: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub processes: Vec<ProcessSpec>,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_seconds: u64,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_backoff: Option<BackoffConfig>,
}

fn default_health_check_interval() -> u64 {
    DEFAULT_HEALTH_CHECK_INTERVAL_SECS
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processes: Vec::new(),
            log_level: LogLevel::default(),
            health_check_interval_seconds: DEFAULT_HEALTH_CHECK_INTERVAL_SECS,
            http_port: DEFAULT_HTTP_PORT,
            restart_backoff: None,
        }
    }
}

impl Config {
    pub fn from_json(content: &str) -> crate::Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_seconds)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.processes.is_empty() {
            return Err(crate::Error::Config("no processes configured".to_string()));
        }
        if self.health_check_interval_seconds == 0 {
            return Err(crate::Error::Config(
                "healthCheckIntervalSeconds must be greater than zero".to_string(),
            ));
        }
        if self.http_port == 0 {
            return Err(crate::Error::Config("httpPort must be in 1-65535".to_string()));
        }

        let mut seen = HashSet::new();
        for spec in &self.processes {
            if spec.name.trim().is_empty() {
                return Err(crate::Error::Config("process name must not be empty".to_string()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(crate::Error::Config(format!(
                    "duplicate process name '{}'",
                    spec.name
                )));
            }
            if spec.command.trim().is_empty() {
                return Err(crate::Error::Config(format!(
                    "process '{}' has an empty command",
                    spec.name
                )));
            }
            if spec.port == 0 {
                return Err(crate::Error::Config(format!(
                    "process '{}' port must be in 1-65535",
                    spec.name
                )));
            }
        }

        if let Some(backoff) = &self.restart_backoff
            && backoff.max_delay_ms < backoff.base_delay_ms
        {
            return Err(crate::Error::Config(
                "restartBackoff.maxDelayMs must not be below baseDelayMs".to_string(),
            ));
        }

        Ok(())
    }

    /// Logs the effective configuration, one field per line.
    pub fn dump(&self) {
        tracing::debug!("--- Configuration ---");
        for spec in &self.processes {
            tracing::debug!("Process Name: {}", spec.name);
            tracing::debug!("  Command: {}", spec.command);
            tracing::debug!("  Args: {:?}", spec.args);
            tracing::debug!("  PauseMs: {}", spec.pause_ms);
            tracing::debug!("  Port: {}", spec.port);
        }
        tracing::debug!("Log level: {}", self.log_level);
        tracing::debug!(
            "HealthCheckIntervalSeconds: {}",
            self.health_check_interval_seconds
        );
        tracing::debug!("HttpPort: {}", self.http_port);
        if let Some(backoff) = &self.restart_backoff {
            tracing::debug!("RestartBackoff: {:?}", backoff);
        }
        tracing::debug!("--- End of Configuration ---");
    }
}
