use std::{
    ffi::OsString,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::{Arc, mpsc::Sender},
};

use parking_lot::Mutex;
use tracing::{debug, instrument, trace, warn};

use crate::error::{MixError, MixResult};

pub const TOOL_OUTPUT_TARGET: &str = "slotmix_core::tool_output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    #[must_use]
    pub fn program_name(&self) -> String {
        self.program
            .file_stem()
            .map_or_else(|| self.program.display().to_string(), |stem| {
                stem.to_string_lossy().into_owned()
            })
    }

    #[must_use]
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[must_use]
    pub fn last_arg_path(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }

    #[must_use]
    pub fn rendered(&self) -> String {
        let mut rendered = self.program.display().to_string();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(&arg.to_string_lossy());
        }
        rendered
    }
}

pub trait LogSink {
    fn line(&mut self, line: &str);
}

impl<F> LogSink for F
where
    F: FnMut(&str),
{
    fn line(&mut self, line: &str) {
        self(line);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn line(&mut self, line: &str) {
        println!("{line}");
    }
}

#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<String>,
    disconnected: bool,
}

impl ChannelSink {
    #[must_use]
    pub fn new(sender: Sender<String>) -> Self {
        Self {
            sender,
            disconnected: false,
        }
    }
}

impl LogSink for ChannelSink {
    fn line(&mut self, line: &str) {
        if self.disconnected {
            return;
        }
        if self.sender.send(line.to_string()).is_err() {
            warn!("log receiver disconnected; further tool output is dropped");
            self.disconnected = true;
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct SharedBufferSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl SharedBufferSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.lines)
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    #[must_use]
    pub fn text(&self) -> String {
        let lines = self.lines.lock();
        let mut text = String::new();
        for line in lines.iter() {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl LogSink for SharedBufferSink {
    fn line(&mut self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

pub trait ProcessRunner {
    fn run(&mut self, command: &ToolCommand) -> MixResult<()>;
}

#[derive(Debug)]
pub struct SystemRunner<S> {
    sink: S,
}

impl SystemRunner<StdoutSink> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(StdoutSink)
    }
}

impl<S: LogSink> SystemRunner<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: LogSink> ProcessRunner for SystemRunner<S> {
    #[instrument(skip(self, command), fields(program = %command.program_name()))]
    fn run(&mut self, command: &ToolCommand) -> MixResult<()> {
        let rendered = command.rendered();
        self.sink.line(&format!(">> {rendered}"));
        debug!(command = %rendered, "spawning external tool");

        let mut expression = duct::cmd(command.program.as_os_str(), command.args.iter())
            .stderr_to_stdout()
            .unchecked();
        if let Some(dir) = &command.cwd {
            expression = expression.dir(dir);
        }

        let handle = expression.reader().map_err(|source| MixError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        let mut captured = Vec::new();
        let sink = &mut self.sink;
        let stream_result = for_each_line(BufReader::new(&handle), |line| {
            trace!(target: TOOL_OUTPUT_TARGET, "{line}");
            sink.line(line);
            captured.push(line.to_string());
        });
        if let Err(source) = stream_result {
            if let Err(kill_error) = handle.kill() {
                warn!(command = %rendered, %kill_error, "failed to kill tool after read error");
            }
            return Err(MixError::Spawn {
                command: rendered,
                source,
            });
        }

        let status = match handle.try_wait() {
            Ok(Some(output)) => output.status,
            Ok(None) => {
                return Err(MixError::Io(format!(
                    "output stream closed before `{rendered}` exited"
                )));
            }
            Err(source) => {
                return Err(MixError::Spawn {
                    command: rendered,
                    source,
                });
            }
        };

        if status.success() {
            debug!(lines = captured.len(), "external tool finished");
            return Ok(());
        }

        let code = status.code();
        self.sink.line(&format!(
            "Command failed with exit code {}",
            code.map_or_else(|| "<signal>".to_string(), |code| code.to_string())
        ));
        warn!(command = %rendered, ?code, "external tool failed");
        Err(MixError::ToolFailed {
            command: rendered,
            code,
            output: captured,
        })
    }
}

pub fn for_each_line<R, F>(mut reader: R, mut on_line: F) -> std::io::Result<()>
where
    R: BufRead,
    F: FnMut(&str),
{
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        let read = reader.read_until(b'\n', &mut buffer)?;
        if read == 0 {
            return Ok(());
        }
        if buffer.last() == Some(&b'\n') {
            buffer.pop();
        }

        let text = String::from_utf8_lossy(&buffer);
        if !text.contains('\r') {
            on_line(&text);
            continue;
        }
        for piece in text.split('\r').filter(|piece| !piece.is_empty()) {
            on_line(piece);
        }
    }
}
