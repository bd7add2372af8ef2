//! Configuration management with environment variable support.
//!
//! This module provides [`Config`] for loading and validating shredder settings
//! from JSON files and environment variables.
//!
//! ## Environment Variables
//!
//! - `SHREDDER_WORKERS`: Override the worker thread count
//! - `SHREDDER_ITERATIONS`: Override the default pass count
//! - `SHREDDER_CONFIG`: Override config file path

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::thread;
use tracing::{debug, info, warn};

use crate::validator::{MAX_ITERATIONS, MIN_ITERATIONS};

/// Environment variable names for configuration overrides
pub const ENV_WORKERS: &str = "SHREDDER_WORKERS";
pub const ENV_ITERATIONS: &str = "SHREDDER_ITERATIONS";
pub const ENV_CONFIG_PATH: &str = "SHREDDER_CONFIG";

/// Pass count used when the caller does not supply one
pub const DEFAULT_ITERATIONS: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker thread count; `None` means one per logical processor
    pub workers: Option<usize>,
    pub default_iterations: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: None,
            default_iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Config {
    /// Load config from file path
    pub fn load(path: &str) -> Result<Self> {
        let s =
            fs::read_to_string(path).with_context(|| format!("reading config file {}", path))?;
        let mut config: Config =
            serde_json::from_str(&s).with_context(|| format!("parsing config file {}", path))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config with environment variable overrides
    /// Priority: ENV vars > config file > defaults
    pub fn load_with_env(path: Option<&str>) -> Result<Self> {
        let config_path = path
            .map(String::from)
            .or_else(|| env::var(ENV_CONFIG_PATH).ok());

        match config_path {
            Some(ref p) if Path::new(p).exists() => {
                info!(path = p, "loading config from file");
                return Self::load(p);
            }
            Some(ref p) => warn!(path = p, "config file not found, using defaults"),
            None => debug!("using default configuration"),
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(workers) = env::var(ENV_WORKERS) {
            match workers.trim().parse::<usize>() {
                Ok(n) => {
                    debug!(workers = n, "overriding workers from environment");
                    self.workers = Some(n);
                }
                Err(_) => warn!(value = %workers, "ignoring unparsable {}", ENV_WORKERS),
            }
        }

        if let Ok(iterations) = env::var(ENV_ITERATIONS) {
            match iterations.trim().parse::<u32>() {
                Ok(n) => {
                    debug!(iterations = n, "overriding default_iterations from environment");
                    self.default_iterations = n;
                }
                Err(_) => warn!(value = %iterations, "ignoring unparsable {}", ENV_ITERATIONS),
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            anyhow::bail!("workers must be at least 1");
        }

        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.default_iterations) {
            anyhow::bail!(
                "default_iterations must be between {} and {}",
                MIN_ITERATIONS,
                MAX_ITERATIONS
            );
        }

        if let Some(n) = self.workers {
            if n > MAX_ITERATIONS as usize {
                warn!(
                    workers = n,
                    "more workers than the maximum pass count; extra workers stay idle"
                );
            }
        }

        Ok(())
    }

    /// Resolved worker count: the configured value or the host's parallelism.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
}
