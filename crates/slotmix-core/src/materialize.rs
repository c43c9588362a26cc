use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::{
    background::BackgroundAsset,
    commands,
    error::{MixError, MixResult},
    process::ProcessRunner,
    segment::{Segment, SegmentKind},
    sources::{LocalAsset, Source},
    tempo,
    tools::ToolPaths,
    workspace::WorkArea,
};

const PARTIAL_DOWNLOAD_SUFFIXES: [&str; 3] = [".part", ".ytdl", ".fixed.wav"];

pub struct Materializer<'a> {
    tools: &'a ToolPaths,
    runner: &'a mut dyn ProcessRunner,
    work: &'a WorkArea,
}

impl<'a> Materializer<'a> {
    pub fn new(tools: &'a ToolPaths, runner: &'a mut dyn ProcessRunner, work: &'a WorkArea) -> Self {
        Self {
            tools,
            runner,
            work,
        }
    }

    #[instrument(skip(self))]
    pub fn silence(&mut self, seconds: f64) -> MixResult<Segment> {
        let output = self.work.silence_path();
        self.runner
            .run(&commands::silence(&self.tools.ffmpeg, seconds, &output))?;
        produced(SegmentKind::SilenceSegment, None, output)
    }

    #[instrument(skip(self, source), fields(source = %source.label()))]
    pub fn acquire(&mut self, slot: usize, source: &Source) -> MixResult<Segment> {
        match source {
            Source::Remote { url } => self.download(slot, url),
            Source::Local(asset) => self.stage_local(slot, asset),
        }
    }

    #[instrument(skip(self, source), fields(source = %source.label()))]
    pub fn fixed_track(&mut self, slot: usize, source: &Source) -> MixResult<Segment> {
        let raw = self.acquire(slot, source)?;
        let output = self.work.fixed_track_path(slot);
        self.runner
            .run(&commands::normalize(&self.tools.ffmpeg, &raw.path, &output))?;
        info!(slot, path = %output.display(), "track normalized");
        produced(SegmentKind::FixedTrack, Some(slot), output)
    }

    #[instrument(skip(self, fixed), fields(input = %fixed.path.display()))]
    pub fn sped_track(&mut self, slot: usize, fixed: &Segment, speed: f64) -> MixResult<Segment> {
        if tempo::is_identity(speed) {
            debug!("speed is 1.0; tempo adjustment skipped");
            return Ok(fixed.clone());
        }

        let chain = tempo::tempo_chain(speed)?;
        let output = self.work.sped_track_path(slot, speed);
        self.runner.run(&commands::tempo_adjust(
            &self.tools.ffmpeg,
            &fixed.path,
            &output,
            &chain,
        ))?;
        info!(slot, factors = chain.len(), "tempo adjusted");
        produced(SegmentKind::SpedTrack, Some(slot), output)
    }

    #[instrument(skip(self, asset), fields(background = %asset.path.display()))]
    pub fn background_track(&mut self, slot: usize, asset: &BackgroundAsset) -> MixResult<Segment> {
        let output = self.work.background_path(slot);
        self.runner
            .run(&commands::normalize(&self.tools.ffmpeg, &asset.path, &output))?;
        produced(SegmentKind::BackgroundTrack, Some(slot), output)
    }

    fn download(&mut self, slot: usize, url: &str) -> MixResult<Segment> {
        let template = self.work.download_template(slot);
        self.runner
            .run(&commands::download(&self.tools.downloader, url, &template))?;

        let stem = WorkArea::slot_stem(slot);
        let path = find_download(self.work.root(), &stem).ok_or_else(|| {
            MixError::MissingArtifact {
                path: template.clone(),
            }
        })?;
        info!(slot, path = %path.display(), "download completed");
        Ok(Segment::new(SegmentKind::RawDownload, Some(slot), path))
    }

    fn stage_local(&mut self, slot: usize, asset: &LocalAsset) -> MixResult<Segment> {
        let extension = asset.extension().unwrap_or_else(|| "bin".to_string());
        let path = self.work.local_input_path(slot, &extension);
        fs::write(&path, &asset.content)
            .with_context(|| format!("failed to stage local asset: {}", path.display()))?;
        debug!(slot, bytes = asset.content.len(), path = %path.display(), "local asset staged");
        Ok(Segment::new(SegmentKind::RawDownload, Some(slot), path))
    }
}

fn produced(kind: SegmentKind, slot: Option<usize>, path: PathBuf) -> MixResult<Segment> {
    let segment = Segment::new(kind, slot, path);
    segment.ensure_exists()?;
    Ok(segment)
}

#[must_use]
pub fn find_download(directory: &Path, stem: &str) -> Option<PathBuf> {
    let prefix = format!("{stem}.");
    let mut matches: Vec<PathBuf> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            name.starts_with(&prefix)
                && !PARTIAL_DOWNLOAD_SUFFIXES
                    .iter()
                    .any(|suffix| name.ends_with(suffix))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();
    matches.sort();
    matches.into_iter().next()
}
