use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{info, instrument};

const WORK_DIR_PREFIX: &str = "slotmix_";

#[derive(Debug)]
pub struct WorkArea {
    root: PathBuf,
}

impl WorkArea {
    pub fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    #[instrument(fields(parent = %parent.display()))]
    pub fn create_in(parent: &Path) -> Result<Self> {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create work parent: {}", parent.display()))?;
        let dir = tempfile::Builder::new()
            .prefix(WORK_DIR_PREFIX)
            .tempdir_in(parent)
            .context("failed to create work directory")?;
        let root = std::path::absolute(dir.keep())
            .context("failed to resolve absolute work directory")?;
        info!(root = %root.display(), "work area created");
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn slot_stem(slot: usize) -> String {
        format!("video{slot}")
    }

    #[must_use]
    pub fn silence_path(&self) -> PathBuf {
        self.root.join("silence.wav")
    }

    #[must_use]
    pub fn download_template(&self, slot: usize) -> PathBuf {
        self.root.join(format!("{}.%(ext)s", Self::slot_stem(slot)))
    }

    #[must_use]
    pub fn local_input_path(&self, slot: usize, extension: &str) -> PathBuf {
        self.root
            .join(format!("{}.input.{extension}", Self::slot_stem(slot)))
    }

    #[must_use]
    pub fn fixed_track_path(&self, slot: usize) -> PathBuf {
        self.root.join(format!("{}.fixed.wav", Self::slot_stem(slot)))
    }

    #[must_use]
    pub fn sped_track_path(&self, slot: usize, speed: f64) -> PathBuf {
        self.root
            .join(format!("{}_x{speed}.wav", Self::slot_stem(slot)))
    }

    #[must_use]
    pub fn background_path(&self, slot: usize) -> PathBuf {
        self.root.join(format!("background_{slot}.wav"))
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("concat_list.txt")
    }

    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.root.join("run_report.json")
    }

    #[must_use]
    pub fn default_output(&self, extension: &str) -> PathBuf {
        let extension = extension.trim_start_matches('.');
        self.root.join(format!("final_output.{extension}"))
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn discard(self) -> Result<()> {
        fs::remove_dir_all(&self.root)
            .with_context(|| format!("failed to remove work area: {}", self.root.display()))?;
        info!("work area discarded");
        Ok(())
    }
}
