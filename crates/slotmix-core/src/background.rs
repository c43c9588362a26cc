use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::sources::MAX_SLOTS;

pub const BACKGROUND_EXTENSIONS: [&str; 7] = ["wav", "mp3", "m4a", "aac", "flac", "ogg", "opus"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackgroundAsset {
    pub slot: usize,
    pub path: PathBuf,
}

#[must_use]
pub fn background_stem(slot: usize) -> String {
    format!("background_audiofile_{slot:02}")
}

#[must_use]
pub fn background_candidates(directory: &Path, slot: usize) -> Vec<PathBuf> {
    let stem = background_stem(slot);
    BACKGROUND_EXTENSIONS
        .iter()
        .map(|extension| directory.join(format!("{stem}.{extension}")))
        .collect()
}

#[must_use]
pub fn first_existing<F>(candidates: &[PathBuf], exists: F) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    candidates
        .iter()
        .find(|candidate| exists(candidate.as_path()))
        .cloned()
}

pub fn resolve_backgrounds_with<F>(directory: &Path, exists: F) -> Vec<BackgroundAsset>
where
    F: Fn(&Path) -> bool,
{
    (1..=MAX_SLOTS)
        .filter_map(|slot| {
            first_existing(&background_candidates(directory, slot), &exists)
                .map(|path| BackgroundAsset { slot, path })
        })
        .collect()
}

#[instrument(fields(directory = %directory.display()))]
pub fn resolve_backgrounds(directory: &Path) -> Vec<BackgroundAsset> {
    let assets = resolve_backgrounds_with(directory, Path::is_file);
    for slot in 1..=MAX_SLOTS {
        if !assets.iter().any(|asset| asset.slot == slot) {
            debug!(slot, stem = %background_stem(slot), "background slot not found");
        }
    }
    debug!(count = assets.len(), "background resolution complete");
    assets
}

#[must_use]
pub fn clamp_background_index(track_slot: usize, available: usize) -> Option<usize> {
    if available == 0 || track_slot == 0 {
        return None;
    }
    Some(track_slot.min(available) - 1)
}

#[must_use]
pub fn background_for_slot(assets: &[BackgroundAsset], track_slot: usize) -> Option<&BackgroundAsset> {
    let index = clamp_background_index(track_slot, assets.len())?;
    if index + 1 < track_slot {
        warn!(
            track_slot,
            background_slot = assets[index].slot,
            "reusing last available background for track"
        );
    }
    assets.get(index)
}
