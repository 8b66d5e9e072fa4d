//! Configuration for the `trine` command.
//!
//! Settings are layered from lowest to highest precedence:
//!
//! 1. [`Config::default()`]
//! 2. an optional JSON file ([`Config::from_file`])
//! 3. `TRINE_*` environment variables ([`Config::apply_env`])
//! 4. command-line flags
//!
//! # Examples
//!
//! ```text
//! TRINE_RULES=family.n3:ages.n3 TRINE_OUTPUT=json trine --data people.nt
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Rule files, separated by the platform path separator.
pub const ENV_RULES: &str = "TRINE_RULES";
/// Data files, separated by the platform path separator.
pub const ENV_DATA: &str = "TRINE_DATA";
/// Default log filter.
pub const ENV_LOG_LEVEL: &str = "TRINE_LOG_LEVEL";
/// Enables step-by-step reasoner tracing.
pub const ENV_TRACE: &str = "TRINE_TRACE";
/// `text` or `json`.
pub const ENV_OUTPUT: &str = "TRINE_OUTPUT";
/// Prints every inference as it is made.
pub const ENV_SHOW_INFERENCES: &str = "TRINE_SHOW_INFERENCES";
/// Prints reasoner counters after the run.
pub const ENV_STATS: &str = "TRINE_STATS";

/// How the final store is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `s p o .` statement per line.
    #[default]
    Text,
    /// A JSON array of `{subject, predicate, object}` objects.
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Settings for one reasoning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rule files, parsed in order.
    pub rules: Vec<PathBuf>,
    /// Data files; their facts are added in order.
    pub data: Vec<PathBuf>,
    /// Default `env_logger` filter (`RUST_LOG` still wins).
    pub log_level: String,
    /// Log every reasoner step at debug level.
    pub trace: bool,
    /// Output format for the final store.
    pub output: OutputFormat,
    /// Print each inferred fact as it is derived.
    pub show_inferences: bool,
    /// Print reasoner counters after the run.
    pub stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            data: Vec::new(),
            log_level: "info".to_string(),
            trace: false,
            output: OutputFormat::Text,
            show_inferences: false,
            stats: false,
        }
    }
}

impl Config {
    /// Creates a `Config` from defaults and environment variables.
    ///
    /// Reads `TRINE_RULES`, `TRINE_DATA`, `TRINE_LOG_LEVEL`, `TRINE_TRACE`,
    /// `TRINE_OUTPUT`, `TRINE_SHOW_INFERENCES` and `TRINE_STATS`. Values that
    /// do not parse are ignored.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Loads a JSON configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        let config = serde_json::from_str(&text)
            .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Overrides fields from `TRINE_*` environment variables.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| env::var_os(key))
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<OsString>) -> Self {
        if let Some(paths) = var(ENV_RULES) {
            self.rules = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(paths) = var(ENV_DATA) {
            self.data = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }

        let text = |key: &str| var(key).and_then(|v| v.into_string().ok());

        if let Some(level) = text(ENV_LOG_LEVEL) {
            if !level.trim().is_empty() {
                self.log_level = level.trim().to_string();
            }
        }
        if let Some(trace) = text(ENV_TRACE).as_deref().and_then(parse_flag) {
            self.trace = trace;
        }
        if let Some(output) = text(ENV_OUTPUT).as_deref().and_then(OutputFormat::parse) {
            self.output = output;
        }
        if let Some(show) = text(ENV_SHOW_INFERENCES).as_deref().and_then(parse_flag) {
            self.show_inferences = show;
        }
        if let Some(stats) = text(ENV_STATS).as_deref().and_then(parse_flag) {
            self.stats = stats;
        }

        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
