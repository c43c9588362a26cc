#![allow(dead_code)]

use std::{fs, path::Path};

use slotmix_core::{MixError, MixResult, ProcessRunner, ToolCommand, ToolPaths};

pub fn fake_tools() -> ToolPaths {
    ToolPaths::new("/opt/tools/ffmpeg", "/opt/tools/yt-dlp")
}

pub fn write_canonical_wav(path: &Path, seconds: f32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = (seconds * 44_100.0).round() as usize;
    let mut writer = hound::WavWriter::create(path, spec).expect("fixture wav should be creatable");
    for _ in 0..frames {
        writer.write_sample(0_i16).expect("left sample write");
        writer.write_sample(0_i16).expect("right sample write");
    }
    writer.finalize().expect("fixture wav finalize");
}

/// Stands in for yt-dlp and ffmpeg: records every command and writes the
/// file each invocation would have produced.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    pub commands: Vec<ToolCommand>,
    pub fail_on_call: Option<usize>,
    pub fail_code: i32,
    pub skip_download_output: bool,
}

impl ScriptedRunner {
    pub fn failing_at(call: usize, code: i32) -> Self {
        Self {
            fail_on_call: Some(call),
            fail_code: code,
            ..Self::default()
        }
    }

    pub fn calls_to(&self, program: &str) -> Vec<&ToolCommand> {
        self.commands
            .iter()
            .filter(|command| command.program_name() == program)
            .collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&mut self, command: &ToolCommand) -> MixResult<()> {
        self.commands.push(command.clone());
        if self.fail_on_call == Some(self.commands.len()) {
            return Err(MixError::ToolFailed {
                command: command.rendered(),
                code: Some(self.fail_code),
                output: vec!["simulated failure".to_string()],
            });
        }

        let args = command.arg_strings();
        if command.program_name() == "yt-dlp" {
            if self.skip_download_output {
                return Ok(());
            }
            let template_index = args
                .iter()
                .position(|arg| arg == "-o")
                .expect("download command must carry -o")
                + 1;
            let target = args[template_index].replace("%(ext)s", "webm");
            fs::write(target, b"downloaded bytes").expect("fake download write");
            return Ok(());
        }

        let output = command
            .last_arg_path()
            .expect("transcode command must name an output");
        if output.extension().is_some_and(|ext| ext == "wav") {
            write_canonical_wav(output, 0.25);
        } else {
            fs::write(output, b"encoded audio").expect("fake encode write");
        }
        Ok(())
    }
}

pub fn write_backgrounds(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).expect("background dir should be creatable");
    for name in names {
        fs::write(dir.join(name), b"background bytes").expect("background write");
    }
}
