use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    config::PipelineConfig,
    export::OutputCodec,
    segment::{Segment, SegmentKind, inspect_wav},
};

const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub schema_version: u32,
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub config: PipelineConfig,
    pub tempo_chain: Vec<f64>,
    pub codec: OutputCodec,
    pub output_path: PathBuf,
    pub work_dir: PathBuf,
    pub entries: Vec<ReportEntry>,
    pub manifest_sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry {
    pub kind: SegmentKind,
    pub slot: Option<usize>,
    pub path: PathBuf,
    pub duration_seconds: Option<f64>,
}

impl RunReport {
    #[must_use]
    pub fn known_duration_seconds(&self) -> f64 {
        self.entries
            .iter()
            .filter_map(|entry| entry.duration_seconds)
            .sum()
    }
}

pub struct RunSummary<'a> {
    pub config: &'a PipelineConfig,
    pub tempo_chain: Vec<f64>,
    pub codec: OutputCodec,
    pub output_path: &'a Path,
    pub work_dir: &'a Path,
    pub entries: &'a [Segment],
    pub manifest_text: &'a str,
}

#[instrument(skip(summary), fields(entries = summary.entries.len()))]
pub fn build_run_report(summary: &RunSummary<'_>) -> RunReport {
    let entries = summary
        .entries
        .iter()
        .map(|segment| ReportEntry {
            kind: segment.kind,
            slot: segment.slot,
            path: segment.path.clone(),
            duration_seconds: match inspect_wav(&segment.path) {
                Ok(info) => Some(info.duration_seconds),
                Err(error) => {
                    debug!(path = %segment.path.display(), %error, "segment duration unavailable");
                    None
                }
            },
        })
        .collect();

    RunReport {
        schema_version: REPORT_SCHEMA_VERSION,
        run_id: Uuid::new_v4(),
        created_at: Utc::now(),
        config: summary.config.clone(),
        tempo_chain: summary.tempo_chain.clone(),
        codec: summary.codec,
        output_path: summary.output_path.to_path_buf(),
        work_dir: summary.work_dir.to_path_buf(),
        entries,
        manifest_sha256: hash_hex(summary.manifest_text.as_bytes()),
    }
}

pub fn write_run_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_vec_pretty(report).context("failed to serialize run report")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write run report: {}", path.display()))?;
    info!(path = %path.display(), run_id = %report.run_id, "run report written");
    Ok(())
}

pub fn read_run_report(path: &Path) -> Result<RunReport> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read run report: {}", path.display()))?;
    let report: RunReport =
        serde_json::from_slice(&bytes).context("failed to parse run report json")?;
    Ok(report)
}

fn hash_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
