use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing::{debug, instrument};

use crate::{
    error::MixResult,
    segment::Segment,
};

#[derive(Debug, Clone)]
pub struct SlotSegments {
    pub background: Segment,
    pub track: Segment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    entries: Vec<Segment>,
}

impl Timeline {
    #[must_use]
    pub fn interleave(slots: &[SlotSegments], silence: &Segment) -> Self {
        let mut entries = Vec::with_capacity(slots.len() * 4);
        for slot in slots {
            entries.push(slot.background.clone());
            entries.push(slot.track.clone());
            entries.push(silence.clone());
            entries.push(slot.track.clone());
        }
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[Segment] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn manifest_text(&self) -> String {
        let mut text = String::new();
        for segment in &self.entries {
            text.push_str(&manifest_line(&segment.path));
        }
        text
    }

    #[instrument(skip(self), fields(entries = self.entries.len(), path = %path.display()))]
    pub fn write_manifest(self, path: &Path) -> MixResult<Vec<Segment>> {
        for segment in &self.entries {
            segment.ensure_exists()?;
        }

        let text = self.manifest_text();
        fs::write(path, text.as_bytes())
            .with_context(|| format!("failed to write concat manifest: {}", path.display()))?;
        debug!("manifest written");
        Ok(self.entries)
    }
}

#[must_use]
pub fn manifest_line(path: &Path) -> String {
    let escaped = posix_path(path).replace('\'', r"'\''");
    format!("file '{escaped}'\n")
}

fn posix_path(path: &Path) -> String {
    let absolute: PathBuf = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let text = absolute.to_string_lossy().into_owned();
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text
    }
}
