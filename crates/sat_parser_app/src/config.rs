use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use engine_logging::{LogDestination, DEFAULT_LOG_FILE};
use sat_parser_core::{IntakePolicy, MAX_FILE_BYTES};
use sat_parser_engine::{EngineConfig, ProcessingSettings, ReadSettings};
use serde::{Deserialize, Serialize};

use crate::cli::ProcessArgs;

pub const DEFAULT_CONFIG_FILE: &str = "./sat_parser.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub max_file_bytes: u64,
    pub max_concurrent_jobs: usize,
    pub read_chunk_bytes: usize,
    pub processing_tick_ms: u64,
    pub max_processing_increment: f32,
    pub export_stagger_ms: u64,
    pub log_destination: LogDestination,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            max_file_bytes: MAX_FILE_BYTES,
            max_concurrent_jobs: 4,
            read_chunk_bytes: 64 * 1024,
            processing_tick_ms: 500,
            max_processing_increment: 15.0,
            export_stagger_ms: 0,
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn apply_overrides(&mut self, args: &ProcessArgs) {
        if let Some(dir) = &args.output {
            self.output_dir = dir.clone();
        }
        if let Some(n) = args.max_concurrent {
            self.max_concurrent_jobs = n;
        }
    }

    pub fn intake_policy(&self) -> IntakePolicy {
        IntakePolicy {
            max_file_bytes: self.max_file_bytes,
            ..IntakePolicy::default()
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            read: ReadSettings {
                chunk_bytes: self.read_chunk_bytes,
                max_bytes: self.max_file_bytes,
            },
            processing: ProcessingSettings {
                tick: Duration::from_millis(self.processing_tick_ms),
                max_increment: self.max_processing_increment,
            },
            max_concurrent_jobs: self.max_concurrent_jobs,
        }
    }

    pub fn export_stagger(&self) -> Duration {
        Duration::from_millis(self.export_stagger_ms)
    }
}
