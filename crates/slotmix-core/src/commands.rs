use std::path::Path;

use crate::{
    process::ToolCommand,
    segment::{CANONICAL_CHANNELS, CANONICAL_CODEC, CANONICAL_SAMPLE_RATE},
    tempo,
};

pub const DOWNLOAD_FORMAT: &str = "bestaudio[abr<=160]/bestaudio";
pub const SILENCE_SOURCE: &str = "anullsrc=r=48000:cl=stereo";

fn canonical_pcm_args() -> [String; 6] {
    [
        "-ar".to_string(),
        CANONICAL_SAMPLE_RATE.to_string(),
        "-ac".to_string(),
        CANONICAL_CHANNELS.to_string(),
        "-c:a".to_string(),
        CANONICAL_CODEC.to_string(),
    ]
}

#[must_use]
pub fn silence(ffmpeg: &Path, seconds: f64, output: &Path) -> ToolCommand {
    ToolCommand::new(ffmpeg)
        .args(["-y", "-f", "lavfi", "-i", SILENCE_SOURCE, "-t"])
        .arg(format!("{seconds}"))
        .args(canonical_pcm_args())
        .arg(output)
}

#[must_use]
pub fn normalize(ffmpeg: &Path, input: &Path, output: &Path) -> ToolCommand {
    ToolCommand::new(ffmpeg)
        .args(["-y", "-i"])
        .arg(input)
        .args(canonical_pcm_args())
        .arg(output)
}

#[must_use]
pub fn tempo_adjust(ffmpeg: &Path, input: &Path, output: &Path, chain: &[f64]) -> ToolCommand {
    ToolCommand::new(ffmpeg)
        .args(["-y", "-i"])
        .arg(input)
        .arg("-filter:a")
        .arg(tempo::atempo_filter(chain))
        .args(canonical_pcm_args())
        .arg(output)
}

#[must_use]
pub fn download(downloader: &Path, url: &str, output_template: &Path) -> ToolCommand {
    ToolCommand::new(downloader)
        .args(["-f", DOWNLOAD_FORMAT, "--no-playlist", "-o"])
        .arg(output_template)
        .arg(url)
}
