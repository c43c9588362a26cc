use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::{
    config::ToolsConfig,
    error::{MixError, MixResult},
};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub downloader: PathBuf,
}

impl ToolPaths {
    #[must_use]
    pub fn new(ffmpeg: impl Into<PathBuf>, downloader: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            downloader: downloader.into(),
        }
    }

    #[instrument(skip(config), fields(ffmpeg = %config.ffmpeg_binary, downloader = %config.downloader_binary))]
    pub fn discover(config: &ToolsConfig) -> MixResult<Self> {
        let ffmpeg = locate(&config.ffmpeg_binary);
        let downloader = locate(&config.downloader_binary);

        match (ffmpeg, downloader) {
            (Some(ffmpeg), Some(downloader)) => {
                debug!(
                    ffmpeg = %ffmpeg.display(),
                    downloader = %downloader.display(),
                    "external tools resolved"
                );
                Ok(Self { ffmpeg, downloader })
            }
            (ffmpeg, downloader) => {
                let mut tools = Vec::new();
                if downloader.is_none() {
                    tools.push(config.downloader_binary.clone());
                }
                if ffmpeg.is_none() {
                    tools.push(config.ffmpeg_binary.clone());
                }
                warn!(?tools, "required external tools are missing");
                Err(MixError::MissingTools { tools })
            }
        }
    }
}

fn locate(binary: &str) -> Option<PathBuf> {
    match which::which(binary) {
        Ok(path) => Some(path),
        Err(error) => {
            debug!(binary, %error, "executable lookup failed");
            None
        }
    }
}
