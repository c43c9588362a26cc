mod support;

use std::fs;

use slotmix_core::{
    LocalAsset, MixEngine, MixError, OutputCodec, PipelineConfig, SegmentKind, Source, WorkArea,
    read_run_report,
};
use support::{ScriptedRunner, fake_tools, write_backgrounds};
use tempfile::tempdir;

fn remote_sources(count: usize) -> Vec<Source> {
    (1..=count)
        .map(|index| Source::remote(format!("https://example.com/watch?v={index}")))
        .collect()
}

fn config_for(bg_dir: &std::path::Path, speed: f64) -> PipelineConfig {
    PipelineConfig {
        speed,
        silence_seconds: 2.0,
        background_dir: bg_dir.to_path_buf(),
        ..PipelineConfig::default()
    }
}

#[test]
fn four_tracks_with_two_backgrounds_interleave_and_clamp() {
    let temp = tempdir().expect("tempdir should be creatable");
    let bg_dir = temp.path().join("bg");
    write_backgrounds(
        &bg_dir,
        &["background_audiofile_01.mp3", "background_audiofile_02.wav"],
    );
    let work = WorkArea::create_in(&temp.path().join("work")).expect("work area should be creatable");

    let mut engine = MixEngine::new(fake_tools(), ScriptedRunner::default());
    let outcome = engine
        .run(&work, remote_sources(4), &config_for(&bg_dir, 1.25))
        .expect("mix should succeed");

    assert_eq!(outcome.timeline.len(), 16);
    let silence_path = work.silence_path();
    for (index, group) in outcome.timeline.chunks(4).enumerate() {
        let slot = index + 1;
        assert_eq!(group[0].kind, SegmentKind::BackgroundTrack);
        assert_eq!(group[0].path, work.background_path(slot));
        assert_eq!(group[1].kind, SegmentKind::SpedTrack);
        assert_eq!(group[1].path, work.sped_track_path(slot, 1.25));
        assert_eq!(group[2].path, silence_path);
        assert_eq!(group[3], group[1]);
    }

    let runner = engine.runner();
    let background_inputs: Vec<String> = (1..=4)
        .map(|slot| {
            let output = work.background_path(slot);
            let command = runner
                .commands
                .iter()
                .find(|command| command.last_arg_path() == Some(output.as_path()))
                .expect("each slot normalizes its own background");
            command.arg_strings()[2].clone()
        })
        .collect();
    assert!(background_inputs[0].ends_with("background_audiofile_01.mp3"));
    for input in &background_inputs[1..] {
        assert!(input.ends_with("background_audiofile_02.wav"));
    }

    assert_eq!(runner.calls_to("yt-dlp").len(), 4);
    // silence + 4 normalize + 4 tempo + 4 background + concat
    assert_eq!(runner.calls_to("ffmpeg").len(), 14);
    let tempo_calls = runner
        .calls_to("ffmpeg")
        .into_iter()
        .filter(|command| command.arg_strings().iter().any(|arg| arg == "-filter:a"))
        .count();
    assert_eq!(tempo_calls, 4);

    let manifest = fs::read_to_string(&outcome.manifest_path).expect("manifest should exist");
    assert_eq!(manifest.lines().count(), 16);
    assert!(manifest.lines().all(|line| line.starts_with("file '") && line.ends_with('\'')));

    assert_eq!(outcome.codec, OutputCodec::Pcm);
    assert_eq!(outcome.output_path, work.default_output("wav"));
    assert!(outcome.output_path.is_file());
}

#[test]
fn unit_speed_passes_fixed_tracks_through() {
    let temp = tempdir().expect("tempdir should be creatable");
    let bg_dir = temp.path().join("bg");
    write_backgrounds(&bg_dir, &["background_audiofile_01.ogg"]);
    let work = WorkArea::create_in(temp.path()).expect("work area should be creatable");

    let mut engine = MixEngine::new(fake_tools(), ScriptedRunner::default());
    let outcome = engine
        .run(&work, remote_sources(2), &config_for(&bg_dir, 1.0))
        .expect("mix should succeed");

    assert_eq!(outcome.timeline.len(), 8);
    assert_eq!(outcome.timeline[1].kind, SegmentKind::FixedTrack);
    assert_eq!(outcome.timeline[1].path, work.fixed_track_path(1));
    assert_eq!(outcome.timeline[5].path, work.fixed_track_path(2));
    assert!(
        engine
            .runner()
            .commands
            .iter()
            .all(|command| !command.arg_strings().iter().any(|arg| arg == "-filter:a")),
        "no tempo stage should run at speed 1.0"
    );

    let report_path = outcome.report_path.as_deref().expect("report should be written");
    let report = read_run_report(report_path).expect("report should parse");
    assert_eq!(report.tempo_chain, vec![1.0]);
    assert_eq!(report.entries.len(), 8);
    assert!(report.entries.iter().all(|entry| entry.duration_seconds.is_some()));
    assert!((report.known_duration_seconds() - 2.0).abs() < 1e-6);
    assert_eq!(report.manifest_sha256.len(), 64);
}

#[test]
fn report_write_failure_does_not_fail_finished_mix() {
    let temp = tempdir().expect("tempdir should be creatable");
    let bg_dir = temp.path().join("bg");
    write_backgrounds(&bg_dir, &["background_audiofile_01.wav"]);
    let work = WorkArea::create_in(temp.path()).expect("work area should be creatable");
    fs::create_dir(work.report_path()).expect("blocking directory should be creatable");

    let mut engine = MixEngine::new(fake_tools(), ScriptedRunner::default());
    let outcome = engine
        .run(&work, remote_sources(1), &config_for(&bg_dir, 1.0))
        .expect("a report write failure should not fail the mix");

    assert!(outcome.report_path.is_none());
    assert!(outcome.output_path.is_file());
    assert!(work.report_path().is_dir());
}

#[test]
fn tool_failure_keeps_materialized_segments() {
    let temp = tempdir().expect("tempdir should be creatable");
    let bg_dir = temp.path().join("bg");
    write_backgrounds(&bg_dir, &["background_audiofile_01.wav"]);
    let work = WorkArea::create_in(temp.path()).expect("work area should be creatable");

    // calls: silence, download 1, normalize 1, download 2
    let mut engine = MixEngine::new(fake_tools(), ScriptedRunner::failing_at(4, 1));
    let error = engine
        .run(&work, remote_sources(3), &config_for(&bg_dir, 1.0))
        .expect_err("second download should fail");

    match &error {
        MixError::ToolFailed { command, code, output } => {
            assert_eq!(*code, Some(1));
            assert!(command.contains("--no-playlist"));
            assert_eq!(output, &vec!["simulated failure".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(error.exit_code(), Some(1));
    assert_eq!(engine.runner().commands.len(), 4);
    assert!(work.root().is_dir());
    assert!(work.silence_path().is_file());
    assert!(work.fixed_track_path(1).is_file());
    assert!(!work.manifest_path().exists());
}

#[test]
fn configuration_errors_spawn_nothing() {
    let temp = tempdir().expect("tempdir should be creatable");
    let bg_dir = temp.path().join("bg");
    write_backgrounds(&bg_dir, &["background_audiofile_01.wav"]);
    let empty_bg = temp.path().join("empty");
    fs::create_dir_all(&empty_bg).expect("empty dir should be creatable");
    let work = WorkArea::create_in(temp.path()).expect("work area should be creatable");

    let mut engine = MixEngine::new(fake_tools(), ScriptedRunner::default());

    let error = engine
        .run(&work, remote_sources(1), &config_for(&bg_dir, 0.0))
        .expect_err("zero speed must be rejected");
    assert!(matches!(error, MixError::InvalidConfig(_)));

    let placeholders = vec![Source::remote("/"), Source::remote("  ")];
    let error = engine
        .run(&work, placeholders, &config_for(&bg_dir, 1.0))
        .expect_err("placeholder-only input must be rejected");
    assert!(matches!(error, MixError::NoSources));

    let error = engine
        .run(&work, remote_sources(1), &config_for(&empty_bg, 1.0))
        .expect_err("missing backgrounds must be rejected");
    assert!(matches!(error, MixError::NoBackgrounds { .. }));
    assert!(error.is_configuration());

    assert!(engine.runner().commands.is_empty());
}

#[test]
fn local_asset_is_staged_and_mp3_output_selected() {
    let temp = tempdir().expect("tempdir should be creatable");
    let bg_dir = temp.path().join("bg");
    write_backgrounds(&bg_dir, &["background_audiofile_03.flac"]);
    let work = WorkArea::create_in(temp.path()).expect("work area should be creatable");
    let output = temp.path().join("exports").join("mix.mp3");

    let sources = vec![
        Source::Local(LocalAsset::new("Song.MP3", b"local bytes".to_vec())),
        Source::remote("https://example.com/watch?v=2"),
    ];
    let config = PipelineConfig {
        output_path: Some(output.clone()),
        ..config_for(&bg_dir, 1.0)
    };

    let mut engine = MixEngine::new(fake_tools(), ScriptedRunner::default());
    let outcome = engine.run(&work, sources, &config).expect("mix should succeed");

    let staged = work.local_input_path(1, "mp3");
    assert_eq!(fs::read(&staged).expect("staged asset"), b"local bytes");
    assert_eq!(engine.runner().calls_to("yt-dlp").len(), 1);

    assert_eq!(outcome.codec, OutputCodec::Mp3);
    assert_eq!(outcome.output_path, output);
    assert!(output.is_file());
    let concat = engine
        .runner()
        .commands
        .last()
        .expect("concat should be the last command")
        .arg_strings();
    assert!(concat.windows(2).any(|pair| pair == ["-c:a", "libmp3lame"]));
    assert!(concat.windows(2).any(|pair| pair == ["-b:a", "192k"]));
}

#[test]
fn missing_download_output_is_reported() {
    let temp = tempdir().expect("tempdir should be creatable");
    let bg_dir = temp.path().join("bg");
    write_backgrounds(&bg_dir, &["background_audiofile_01.wav"]);
    let work = WorkArea::create_in(temp.path()).expect("work area should be creatable");

    let runner = ScriptedRunner {
        skip_download_output: true,
        ..ScriptedRunner::default()
    };
    let mut engine = MixEngine::new(fake_tools(), runner);
    let error = engine
        .run(&work, remote_sources(1), &config_for(&bg_dir, 1.0))
        .expect_err("download without a file must fail");
    assert!(matches!(error, MixError::MissingArtifact { .. }));
}
