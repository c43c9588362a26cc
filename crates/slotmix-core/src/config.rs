use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    error::{MixError, MixResult},
    tempo,
};

pub const CONFIG_FILE_NAME: &str = "slotmix.config.toml";
pub const CONFIG_PATH_ENV: &str = "SLOTMIX_CONFIG_PATH";
pub const DEFAULT_LOG_FILTER: &str = "info,slotmix_core=debug,slotmix_core::tool_output=trace";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub speed: f64,
    pub silence_seconds: f64,
    pub background_gain_db: f64,
    pub output_path: Option<PathBuf>,
    pub output_extension: String,
    pub background_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            silence_seconds: 5.0,
            background_gain_db: -6.0,
            output_path: None,
            output_extension: "wav".to_string(),
            background_dir: PathBuf::from("."),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> MixResult<()> {
        tempo::validate_speed(self.speed)?;
        if !self.silence_seconds.is_finite() || self.silence_seconds <= 0.0 {
            return Err(MixError::InvalidConfig(format!(
                "silence duration must be a finite number of seconds > 0 (got {})",
                self.silence_seconds
            )));
        }
        if !self.background_gain_db.is_finite() {
            return Err(MixError::InvalidConfig(format!(
                "background gain must be a finite dB value (got {})",
                self.background_gain_db
            )));
        }
        if self.output_path.is_none() && self.output_extension.trim_matches('.').is_empty() {
            return Err(MixError::InvalidConfig(
                "output extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub tools: ToolsConfig,
    pub diagnostics: DiagnosticsConfig,
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_binary: String,
    pub downloader_binary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub log_dir: PathBuf,
    pub rust_log_filter: String,
    pub trace_file_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub keep_work: bool,
    pub parent_dir: Option<PathBuf>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: "ffmpeg".to_string(),
            downloader_binary: "yt-dlp".to_string(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            rust_log_filter: DEFAULT_LOG_FILTER.to_string(),
            trace_file_prefix: "slotmix".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse slotmix config TOML")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn load_or_default() -> Result<Self> {
        match discover_config_path()? {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }
}

fn discover_config_path() -> Result<Option<PathBuf>> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(anyhow::anyhow!(
            "{CONFIG_PATH_ENV} points to a missing file: {}",
            path.display()
        ));
    }

    let cwd = env::current_dir().context("failed to resolve current directory")?;
    let candidates = [
        cwd.join(CONFIG_FILE_NAME),
        cwd.join("..").join(CONFIG_FILE_NAME),
    ];

    Ok(candidates.into_iter().find(|path| path.is_file()))
}
