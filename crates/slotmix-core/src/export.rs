use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    error::MixResult,
    process::{ProcessRunner, ToolCommand},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputCodec {
    Mp3,
    Aac,
    Pcm,
}

impl OutputCodec {
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("mp3") => Self::Mp3,
            Some("m4a" | "aac") => Self::Aac,
            _ => Self::Pcm,
        }
    }

    #[must_use]
    pub fn encoder(self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::Aac => "aac",
            Self::Pcm => "pcm_s16le",
        }
    }

    #[must_use]
    pub fn bitrate(self) -> Option<&'static str> {
        match self {
            Self::Mp3 | Self::Aac => Some("192k"),
            Self::Pcm => None,
        }
    }

    #[must_use]
    pub fn codec_args(self) -> Vec<&'static str> {
        let mut args = vec!["-c:a", self.encoder()];
        if let Some(bitrate) = self.bitrate() {
            args.extend(["-b:a", bitrate]);
        }
        args
    }
}

#[must_use]
pub fn concat_command(ffmpeg: &Path, manifest: &Path, output: &Path) -> ToolCommand {
    let codec = OutputCodec::for_path(output);
    ToolCommand::new(ffmpeg)
        .args(["-y", "-f", "concat", "-safe", "0", "-i"])
        .arg(manifest)
        .args(codec.codec_args())
        .arg(output)
}

#[instrument(skip(runner), fields(manifest = %manifest.display(), output = %output.display()))]
pub fn concat_manifest(
    runner: &mut dyn ProcessRunner,
    ffmpeg: &Path,
    manifest: &Path,
    output: &Path,
) -> MixResult<OutputCodec> {
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create output directory: {}", parent.display())
        })?;
    }

    let codec = OutputCodec::for_path(output);
    runner.run(&concat_command(ffmpeg, manifest, output))?;
    info!(codec = ?codec, "concatenation completed");
    Ok(codec)
}
