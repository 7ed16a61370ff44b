use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::error::{ChaosError, ChaosResult};

/// Prefix of the environment variables read by [`Config::load`]
pub const ENV_PREFIX: &str = "PODCHAOSMONKEY";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_kubeconfig")]
    pub kubeconfig: Option<String>,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Human readable duration, e.g. `1h`, `15m`, `1h30m`
    #[serde(default = "default_deletion_interval")]
    pub deletion_interval: String,

    /// Label selector narrowing the candidate pods, all running pods when unset
    #[serde(default = "default_label_selector")]
    pub label_selector: Option<String>,

    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Numeric verbosity, raises the log level when high enough
    #[serde(skip)]
    pub verbosity: u8,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

fn default_kubeconfig() -> Option<String> {
    None
}

fn default_namespace() -> String {
    "workloads".to_string()
}

fn default_deletion_interval() -> String {
    "1h".to_string()
}

fn default_label_selector() -> Option<String> {
    None
}

fn default_dry_run() -> bool {
    false
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Command-line flags, each one overriding its environment counterpart
#[derive(Debug, Default, Parser)]
#[command(name = "podchaosmonkey", version, about = "Randomly deletes running pods in a namespace")]
pub struct Cli {
    /// Path to a kubeconfig, falls back to `KUBECONFIG` or in-cluster config if not provided
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Namespace to watch
    #[arg(long)]
    pub namespace: Option<String>,

    /// Interval between two pod deletions (e.g. 30s, 15m, 1h)
    #[arg(long)]
    pub deletion_interval: Option<String>,

    /// Only pods matching this label selector are candidates (e.g. app=web)
    #[arg(long)]
    pub label_selector: Option<String>,

    /// Do not actually delete pods, only have the API server validate the deletion
    #[arg(long)]
    pub dry_run: bool,

    /// Log level or filter directive
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log verbosity, 3 and above enables debug output
    #[arg(short = 'v', long, default_value_t = 0)]
    pub verbosity: u8,
}

impl Config {
    /// Load configuration from defaults, `.env` and the environment
    pub fn load() -> ChaosResult<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ChaosError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ChaosError::Config(e.to_string()))
    }

    /// Apply command-line flags on top of the loaded settings
    pub fn with_cli(mut self, cli: Cli) -> Self {
        if let Some(kubeconfig) = cli.kubeconfig {
            self.kubeconfig = Some(kubeconfig);
        }
        if let Some(namespace) = cli.namespace {
            self.namespace = namespace;
        }
        if let Some(interval) = cli.deletion_interval {
            self.deletion_interval = interval;
        }
        if let Some(selector) = cli.label_selector {
            self.label_selector = Some(selector);
        }
        if cli.dry_run {
            self.dry_run = true;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if let Some(format) = cli.log_format {
            self.log_format = format;
        }
        self.verbosity = cli.verbosity;
        self
    }

    /// Reject settings the agent cannot run with
    pub fn validate(&self) -> ChaosResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(ChaosError::config("namespace must not be empty"));
        }
        self.deletion_interval()?;
        Ok(())
    }

    /// Configured label selector, `None` when unset or blank
    pub fn label_selector(&self) -> Option<&str> {
        self.label_selector
            .as_deref()
            .map(str::trim)
            .filter(|selector| !selector.is_empty())
    }

    pub fn deletion_interval(&self) -> ChaosResult<Duration> {
        let interval = parse_duration(&self.deletion_interval)?;
        if interval.is_zero() {
            return Err(ChaosError::config("deletion interval must be greater than zero"));
        }
        Ok(interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kubeconfig: default_kubeconfig(),
            namespace: default_namespace(),
            deletion_interval: default_deletion_interval(),
            label_selector: default_label_selector(),
            dry_run: default_dry_run(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            verbosity: 0,
        }
    }
}

/// Parse a human readable duration such as `90s`, `15m`, `1h30m` or `250ms`
pub fn parse_duration(input: &str) -> ChaosResult<Duration> {
    humantime::parse_duration(input.trim())
        .map_err(|e| ChaosError::Config(format!("invalid duration '{}': {}", input, e)))
}
