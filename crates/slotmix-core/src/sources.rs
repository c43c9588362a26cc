use std::{fmt, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const MAX_SLOTS: usize = 4;

pub const PLACEHOLDER_TOKENS: [&str; 3] = ["/", "\\", "|"];

pub const LOCAL_AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "wav", "m4a", "aac", "flac", "ogg", "opus"];

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalAsset {
    pub name: String,
    pub content: Vec<u8>,
}

impl LocalAsset {
    #[must_use]
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read(path)
            .with_context(|| format!("failed to read local audio file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, content })
    }

    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase)
    }

    #[must_use]
    pub fn has_supported_extension(&self) -> bool {
        self.extension()
            .is_some_and(|extension| LOCAL_AUDIO_EXTENSIONS.contains(&extension.as_str()))
    }
}

impl fmt::Debug for LocalAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAsset")
            .field("name", &self.name)
            .field("content_len", &self.content.len())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Source {
    Remote { url: String },
    Local(LocalAsset),
}

impl Source {
    #[must_use]
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote { url: url.into() }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Remote { url } => url,
            Self::Local(asset) => &asset.name,
        }
    }
}

#[must_use]
pub fn is_placeholder(entry: &str) -> bool {
    let trimmed = entry.trim();
    trimmed.is_empty() || PLACEHOLDER_TOKENS.contains(&trimmed)
}

pub fn resolve_entries<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter(|entry| !is_placeholder(entry.as_ref()))
        .map(|entry| entry.as_ref().trim().to_string())
        .take(MAX_SLOTS)
        .collect()
}

#[must_use]
pub fn parse_source_lines(text: &str) -> Vec<String> {
    resolve_entries(text.lines())
}

pub fn resolve_sources<I>(candidates: I) -> Vec<Source>
where
    I: IntoIterator<Item = Source>,
{
    let resolved: Vec<Source> = candidates
        .into_iter()
        .filter_map(|candidate| match candidate {
            Source::Remote { url } => {
                if is_placeholder(&url) {
                    None
                } else {
                    Some(Source::remote(url.trim()))
                }
            }
            Source::Local(asset) => {
                if !asset.has_supported_extension() {
                    warn!(
                        name = %asset.name,
                        supported = ?LOCAL_AUDIO_EXTENSIONS,
                        "dropping local asset with unsupported format"
                    );
                    None
                } else if asset.content.is_empty() {
                    warn!(name = %asset.name, "dropping empty local asset");
                    None
                } else {
                    Some(Source::Local(asset))
                }
            }
        })
        .take(MAX_SLOTS)
        .collect();

    debug!(count = resolved.len(), "sources resolved");
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_dropped_and_list_is_capped() {
        let raw = ["", "  ", "/", "validURL", "another", "extra1", "extra2"];
        assert_eq!(
            resolve_entries(raw),
            vec!["validURL", "another", "extra1", "extra2"]
        );
    }

    #[test]
    fn backslash_and_pipe_are_placeholders() {
        assert!(is_placeholder("\\"));
        assert!(is_placeholder(" | "));
        assert!(!is_placeholder("https://example.com/watch?v=1"));
    }

    #[test]
    fn free_text_is_split_per_line() {
        let text = "https://a\n\n/\n  https://b  \r\n";
        assert_eq!(parse_source_lines(text), vec!["https://a", "https://b"]);
    }

    #[test]
    fn local_asset_extension_is_case_insensitive() {
        let asset = LocalAsset::new("Intro.MP3", vec![1, 2, 3]);
        assert_eq!(asset.extension().as_deref(), Some("mp3"));
        assert!(asset.has_supported_extension());
        assert!(!LocalAsset::new("notes.txt", vec![1]).has_supported_extension());
    }
}
