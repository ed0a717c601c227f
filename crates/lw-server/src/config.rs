// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ServerConfig`: loaded from a TOML file and overlaid with CLI flags,
//! mirroring the `oj` CLI's file/flag precedence (flags win).

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use lw_adapters::ModelRoute;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Whether a non-blocking job's output is applied after the round it was
/// recorded against has been superseded by a reroll or a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceRetentionPolicy {
    /// Apply only if the round is still the branch's latest and its
    /// anchor snapshot hasn't changed since the job was recorded.
    RetainIfAnchorUnchanged,
    AlwaysApply,
    AlwaysDiscard,
}

impl Default for GuidanceRetentionPolicy {
    fn default() -> Self {
        Self::RetainIfAnchorUnchanged
    }
}

/// Deployment mode for the job queue: inline (Null, executed by the
/// Outbox Poller directly) or Distributed (broker-backed, external
/// workers drain it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueMode {
    Null,
    Distributed,
}

impl Default for QueueMode {
    fn default() -> Self {
        Self::Null
    }
}

fn default_outbox_poll_ms() -> u64 {
    250
}

fn default_llm_timeout_ms() -> u64 {
    30_000
}

fn default_round_timeout_ms() -> u64 {
    120_000
}

fn default_job_retry_max_attempts() -> u32 {
    5
}

fn default_job_retry_base_ms() -> u64 {
    1_000
}

fn default_job_retry_factor() -> f64 {
    2.0
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_guidance_enabled() -> bool {
    true
}

/// File-backed server configuration. Every field has a default so a
/// missing config file is equivalent to an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub session_store_root: PathBuf,
    pub flow_dirs: Vec<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub outbox_poll_ms: u64,
    pub llm_timeout_ms: u64,
    pub round_timeout_ms: u64,
    pub queue_mode: QueueMode,
    pub job_retry_max_attempts: u32,
    pub job_retry_base_ms: u64,
    pub job_retry_factor: f64,
    pub guidance_retention_policy: GuidanceRetentionPolicy,
    /// Whether `send` schedules a non-blocking Guidance job alongside the
    /// blocking StatusUpdate job. The StatusUpdate job is always scheduled.
    pub guidance_enabled: bool,
    pub model_routes: HashMap<String, ModelRoute>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            session_store_root: PathBuf::from("./data/sessions"),
            flow_dirs: vec![PathBuf::from("./flows")],
            log_path: None,
            outbox_poll_ms: default_outbox_poll_ms(),
            llm_timeout_ms: default_llm_timeout_ms(),
            round_timeout_ms: default_round_timeout_ms(),
            queue_mode: QueueMode::default(),
            job_retry_max_attempts: default_job_retry_max_attempts(),
            job_retry_base_ms: default_job_retry_base_ms(),
            job_retry_factor: default_job_retry_factor(),
            guidance_retention_policy: GuidanceRetentionPolicy::default(),
            guidance_enabled: default_guidance_enabled(),
            model_routes: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// Loads `path` if it exists, falling back to defaults if it doesn't
    /// (a fresh deployment has nothing to load yet).
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies CLI overrides on top of the file-loaded config. Flags win.
    pub fn apply_cli(mut self, cli: &CliArgs) -> Self {
        if let Some(addr) = &cli.bind_addr {
            self.bind_addr = addr.clone();
        }
        if let Some(root) = &cli.session_store_root {
            self.session_store_root = root.clone();
        }
        if !cli.flow_dir.is_empty() {
            self.flow_dirs = cli.flow_dir.clone();
        }
        if let Some(mode) = cli.queue_mode {
            self.queue_mode = mode;
        }
        self
    }
}

/// CLI flags for `loomworkd`. File config is loaded first; any flag
/// present here overrides the corresponding file value.
#[derive(Debug, Parser)]
#[command(name = "loomworkd", version, about = "Loomwork interactive-fiction workflow server")]
pub struct CliArgs {
    /// Path to the TOML config file.
    #[arg(short = 'c', long, default_value = "loomwork.toml")]
    pub config: PathBuf,

    /// Override `bind_addr`.
    #[arg(long)]
    pub bind_addr: Option<String>,

    /// Override `session_store_root`.
    #[arg(long)]
    pub session_store_root: Option<PathBuf>,

    /// Additional directories to load `.flow.hcl`/`.flow.json` documents
    /// from. Replaces the file-configured list entirely when given.
    #[arg(long = "flow-dir")]
    pub flow_dir: Vec<PathBuf>,

    /// Override `queue_mode`.
    #[arg(long, value_enum)]
    pub queue_mode: Option<QueueMode>,
}

impl clap::ValueEnum for QueueMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[QueueMode::Null, QueueMode::Distributed]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            QueueMode::Null => clap::builder::PossibleValue::new("null"),
            QueueMode::Distributed => clap::builder::PossibleValue::new("distributed"),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
