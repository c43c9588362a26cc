use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{MixError, MixResult};

pub const CANONICAL_SAMPLE_RATE: u32 = 44_100;
pub const CANONICAL_CHANNELS: u16 = 2;
pub const CANONICAL_BITS_PER_SAMPLE: u16 = 16;
pub const CANONICAL_CODEC: &str = "pcm_s16le";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    RawDownload,
    FixedTrack,
    SpedTrack,
    BackgroundTrack,
    SilenceSegment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub slot: Option<usize>,
    pub path: PathBuf,
}

impl Segment {
    #[must_use]
    pub fn new(kind: SegmentKind, slot: Option<usize>, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            slot,
            path: path.into(),
        }
    }

    pub fn ensure_exists(&self) -> MixResult<()> {
        if self.path.is_file() {
            Ok(())
        } else {
            Err(MixError::MissingArtifact {
                path: self.path.clone(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub frames: u32,
    pub duration_seconds: f64,
}

impl WavInfo {
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.sample_rate == CANONICAL_SAMPLE_RATE
            && self.channels == CANONICAL_CHANNELS
            && self.bits_per_sample == CANONICAL_BITS_PER_SAMPLE
    }
}

pub fn inspect_wav(path: &Path) -> Result<WavInfo> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open wav segment: {}", path.display()))?;
    let spec = reader.spec();
    let frames = reader.duration();
    let duration_seconds = if spec.sample_rate == 0 {
        0.0
    } else {
        f64::from(frames) / f64::from(spec.sample_rate)
    };

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        frames,
        duration_seconds,
    })
}
