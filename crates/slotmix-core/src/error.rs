use std::path::PathBuf;

use thiserror::Error;

pub type MixResult<T> = Result<T, MixError>;

#[derive(Debug, Error)]
pub enum MixError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no usable audio sources were provided (expected 1 to 4)")]
    NoSources,
    #[error("no background_audiofile_0N found in {}", dir.display())]
    NoBackgrounds { dir: PathBuf },
    #[error("missing required tool(s): {}", tools.join(", "))]
    MissingTools { tools: Vec<String> },
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command failed with exit code {}: {command}", code.map_or_else(|| "<signal>".to_string(), |code| code.to_string()))]
    ToolFailed {
        command: String,
        code: Option<i32>,
        output: Vec<String>,
    },
    #[error("expected artifact is missing: {}", path.display())]
    MissingArtifact { path: PathBuf },
    #[error("io error: {0}")]
    Io(String),
}

impl MixError {
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::NoSources | Self::NoBackgrounds { .. }
        )
    }

    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ToolFailed { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<anyhow::Error> for MixError {
    fn from(value: anyhow::Error) -> Self {
        Self::Io(format!("{value:#}"))
    }
}

impl From<std::io::Error> for MixError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}
