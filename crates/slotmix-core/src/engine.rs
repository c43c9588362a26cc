use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::{
    background::{self, BackgroundAsset},
    config::PipelineConfig,
    error::{MixError, MixResult},
    export::{self, OutputCodec},
    materialize::Materializer,
    process::ProcessRunner,
    report::{self, RunSummary},
    segment::Segment,
    sources::{self, MAX_SLOTS, Source},
    tempo,
    timeline::{SlotSegments, Timeline},
    tools::ToolPaths,
    workspace::WorkArea,
};

#[derive(Debug, Clone)]
pub struct MixPlan {
    pub sources: Vec<Source>,
    pub backgrounds: Vec<BackgroundAsset>,
    pub tempo_chain: Option<Vec<f64>>,
}

impl MixPlan {
    #[must_use]
    pub fn background_indices(&self) -> Vec<usize> {
        (1..=self.sources.len())
            .filter_map(|slot| background::clamp_background_index(slot, self.backgrounds.len()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MixOutcome {
    pub output_path: PathBuf,
    pub work_dir: PathBuf,
    pub codec: OutputCodec,
    pub manifest_path: PathBuf,
    pub report_path: Option<PathBuf>,
    pub timeline: Vec<Segment>,
}

#[instrument(skip(candidates, config), fields(speed = config.speed, silence = config.silence_seconds))]
pub fn plan_mix<I>(candidates: I, config: &PipelineConfig) -> MixResult<MixPlan>
where
    I: IntoIterator<Item = Source>,
{
    config.validate()?;

    let sources = sources::resolve_sources(candidates);
    if sources.is_empty() {
        return Err(MixError::NoSources);
    }
    if sources.len() < MAX_SLOTS {
        info!(
            count = sources.len(),
            "fewer than {MAX_SLOTS} sources; only the first matching backgrounds are used"
        );
    }

    let backgrounds = background::resolve_backgrounds(&config.background_dir);
    if backgrounds.is_empty() {
        return Err(MixError::NoBackgrounds {
            dir: config.background_dir.clone(),
        });
    }

    let tempo_chain = if tempo::is_identity(config.speed) {
        None
    } else {
        Some(tempo::tempo_chain(config.speed)?)
    };

    if config.background_gain_db.abs() > f64::EPSILON {
        warn!(
            gain_db = config.background_gain_db,
            "background gain is recorded but not applied to background audio"
        );
    }

    Ok(MixPlan {
        sources,
        backgrounds,
        tempo_chain,
    })
}

#[derive(Debug)]
pub struct MixEngine<R> {
    tools: ToolPaths,
    runner: R,
}

impl<R: ProcessRunner> MixEngine<R> {
    #[must_use]
    pub fn new(tools: ToolPaths, runner: R) -> Self {
        Self { tools, runner }
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    #[instrument(skip(self, work, candidates, config), fields(work_dir = %work.root().display()))]
    pub fn run<I>(
        &mut self,
        work: &WorkArea,
        candidates: I,
        config: &PipelineConfig,
    ) -> MixResult<MixOutcome>
    where
        I: IntoIterator<Item = Source>,
    {
        let plan = plan_mix(candidates, config)?;
        info!(work_dir = %work.root().display(), "working directory ready");

        match self.execute(work, &plan, config) {
            Ok(outcome) => {
                info!(output = %outcome.output_path.display(), "mix completed");
                Ok(outcome)
            }
            Err(failure) => {
                error!(
                    error = %failure,
                    work_dir = %work.root().display(),
                    "mix failed; leaving work dir for inspection"
                );
                Err(failure)
            }
        }
    }

    pub fn execute(
        &mut self,
        work: &WorkArea,
        plan: &MixPlan,
        config: &PipelineConfig,
    ) -> MixResult<MixOutcome> {
        let mut materializer = Materializer::new(&self.tools, &mut self.runner, work);

        let silence = materializer.silence(config.silence_seconds)?;

        let mut fixed_tracks = Vec::with_capacity(plan.sources.len());
        for (index, source) in plan.sources.iter().enumerate() {
            fixed_tracks.push(materializer.fixed_track(index + 1, source)?);
        }

        let tracks = if plan.tempo_chain.is_some() {
            let mut sped = Vec::with_capacity(fixed_tracks.len());
            for (index, fixed) in fixed_tracks.iter().enumerate() {
                sped.push(materializer.sped_track(index + 1, fixed, config.speed)?);
            }
            sped
        } else {
            fixed_tracks
        };

        let mut slots = Vec::with_capacity(tracks.len());
        for (index, track) in tracks.into_iter().enumerate() {
            let slot = index + 1;
            let asset = background::background_for_slot(&plan.backgrounds, slot).ok_or_else(
                || MixError::NoBackgrounds {
                    dir: config.background_dir.clone(),
                },
            )?;
            let background = materializer.background_track(slot, asset)?;
            slots.push(SlotSegments { background, track });
        }
        drop(materializer);

        let timeline = Timeline::interleave(&slots, &silence);
        let manifest_text = timeline.manifest_text();
        let manifest_path = work.manifest_path();
        let entries = timeline.write_manifest(&manifest_path)?;

        let output_path = match &config.output_path {
            Some(path) => std::path::absolute(path).unwrap_or_else(|_| path.clone()),
            None => work.default_output(&config.output_extension),
        };
        let codec =
            export::concat_manifest(&mut self.runner, &self.tools.ffmpeg, &manifest_path, &output_path)?;

        let report = report::build_run_report(&RunSummary {
            config,
            tempo_chain: plan
                .tempo_chain
                .clone()
                .unwrap_or_else(|| vec![1.0]),
            codec,
            output_path: &output_path,
            work_dir: work.root(),
            entries: &entries,
            manifest_text: &manifest_text,
        });
        let report_path = work.report_path();
        let report_path = match report::write_run_report(&report_path, &report) {
            Ok(()) => Some(report_path),
            Err(report_error) => {
                warn!(
                    path = %report_path.display(),
                    error = %format!("{report_error:#}"),
                    "run report not written; output is complete"
                );
                None
            }
        };

        Ok(MixOutcome {
            output_path,
            work_dir: work.root().to_path_buf(),
            codec,
            manifest_path,
            report_path,
            timeline: entries,
        })
    }
}
