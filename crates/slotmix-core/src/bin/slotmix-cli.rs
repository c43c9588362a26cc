use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use slotmix_core::{
    AppConfig, LocalAsset, MixEngine, Source, SystemRunner, ToolPaths, WorkArea,
    init_tracing, plan_mix, resolve_entries,
};

#[derive(Debug, Parser)]
#[command(name = "slotmix-cli")]
#[command(
    about = "Download or load up to four audio sources, speed-adjust them, and stitch them with background tracks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Mix {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<String>,

        #[arg(long, default_value = "final_output.wav")]
        out: PathBuf,

        #[arg(long)]
        speed: Option<f64>,

        #[arg(long)]
        silence: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        bg_volume_db: Option<f64>,

        #[arg(long)]
        bg_dir: Option<PathBuf>,

        #[arg(long)]
        keep_work: bool,
    },
    CheckTools,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load_or_default()?,
    };
    if let Some(log_dir) = cli.log_dir {
        config.diagnostics.log_dir = log_dir;
    }
    let _telemetry = init_tracing(&config.diagnostics)?;

    let tools = ToolPaths::discover(&config.tools)?;

    match cli.command {
        Commands::CheckTools => {
            println!("ffmpeg: {}", tools.ffmpeg.display());
            println!("downloader: {}", tools.downloader.display());
        }
        Commands::Mix {
            inputs,
            out,
            speed,
            silence,
            bg_volume_db,
            bg_dir,
            keep_work,
        } => {
            let mut pipeline = config.pipeline.clone();
            pipeline.output_path = Some(out);
            if let Some(speed) = speed {
                pipeline.speed = speed;
            }
            if let Some(silence) = silence {
                pipeline.silence_seconds = silence;
            }
            if let Some(gain) = bg_volume_db {
                pipeline.background_gain_db = gain;
            }
            if let Some(bg_dir) = bg_dir {
                pipeline.background_dir = bg_dir;
            }
            let keep_work = keep_work || config.workspace.keep_work;

            let plan = plan_mix(classify_inputs(&inputs)?, &pipeline)?;

            let work = match &config.workspace.parent_dir {
                Some(parent) => WorkArea::create_in(parent)?,
                None => WorkArea::create()?,
            };
            println!("Working directory: {}", work.root().display());

            let mut engine = MixEngine::new(tools, SystemRunner::stdout());
            match engine.execute(&work, &plan, &pipeline) {
                Ok(outcome) => {
                    println!("\nDone. Output: {}", outcome.output_path.display());
                    if keep_work {
                        println!("(Working files kept at: {})", outcome.work_dir.display());
                    } else {
                        work.discard()?;
                    }
                }
                Err(error) => {
                    eprintln!("Error: {error}");
                    eprintln!("Leaving work dir for inspection: {}", work.root().display());
                    return Err(error.into());
                }
            }
        }
    }

    Ok(())
}

fn classify_inputs(inputs: &[String]) -> anyhow::Result<Vec<Source>> {
    resolve_entries(inputs)
        .into_iter()
        .map(|entry| {
            let path = Path::new(&entry);
            if path.is_file() {
                Ok(Source::Local(LocalAsset::from_path(path)?))
            } else {
                Ok(Source::remote(entry))
            }
        })
        .collect()
}
