pub mod background;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod export;
pub mod materialize;
pub mod process;
pub mod report;
pub mod segment;
pub mod sources;
pub mod tempo;
pub mod timeline;
pub mod tools;
pub mod workspace;

pub use background::{BackgroundAsset, background_for_slot, resolve_backgrounds};
pub use config::{AppConfig, PipelineConfig};
pub use diagnostics::{TelemetryGuard, init_tracing};
pub use engine::{MixEngine, MixOutcome, MixPlan, plan_mix};
pub use error::{MixError, MixResult};
pub use export::OutputCodec;
pub use process::{
    ChannelSink, LogSink, ProcessRunner, SharedBufferSink, StdoutSink, SystemRunner, ToolCommand,
};
pub use report::{RunReport, read_run_report};
pub use segment::{Segment, SegmentKind};
pub use sources::{LocalAsset, MAX_SLOTS, Source, resolve_entries, resolve_sources};
pub use tempo::tempo_chain;
pub use timeline::Timeline;
pub use tools::ToolPaths;
pub use workspace::WorkArea;
