use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::exec::parser::{OutputParser, ParsedOutput};
use crate::security::{Action, Domain};

/// Program names (or paths) of the wrapped tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPrograms {
    pub git: String,
    pub gh: String,
}

impl Default for ToolPrograms {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            gh: "gh".to_string(),
        }
    }
}

/// Literal argument vector plus how to treat the output
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub args: Vec<String>,
    pub parser: OutputParser,
    /// Hand the terminal to the child instead of capturing output.
    pub stream: bool,
}

impl Invocation {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            parser: OutputParser::None,
            stream: false,
        }
    }

    pub fn parsed(mut self, parser: OutputParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn streamed(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// Why an execution did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The binary could not be located or started
    Unavailable(String),
    /// Ran and exited non-zero (or was killed by a signal)
    Exited,
    TimedOut(Duration),
    /// Lost track of the child after it started
    Interrupted(String),
    /// Exited zero but the output did not have the expected shape
    Unparsable(String),
}

/// Normalized outcome of one external invocation
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub program: String,
    pub command: String,
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub failure: Option<Failure>,
    pub parsed: Option<ParsedOutput>,
}

impl ExecutionResult {
    fn unavailable(program: &str, command: String, detail: String) -> Self {
        Self {
            program: program.to_string(),
            command,
            succeeded: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            failure: Some(Failure::Unavailable(detail)),
            parsed: None,
        }
    }
}

/// Runs git / gh in a working directory
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    working_dir: PathBuf,
    programs: ToolPrograms,
    timeout: Option<Duration>,
}

impl ToolExecutor {
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            programs: ToolPrograms::default(),
            timeout: None,
        }
    }

    pub fn with_programs(mut self, programs: ToolPrograms) -> Self {
        self.programs = programs;
        self
    }

    /// Kill the child if it runs longer than `timeout`. Without one the
    /// executor waits for as long as the child runs.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn program_for(&self, domain: Domain) -> &str {
        match domain {
            Domain::Git => &self.programs.git,
            Domain::Github => &self.programs.gh,
        }
    }

    /// Run the tool for `action`. Must only be called once the gate's
    /// verdict is final and `Allow`.
    #[instrument(skip_all, fields(action = %action))]
    pub fn execute(&self, action: &Action, invocation: &Invocation) -> ExecutionResult {
        let program = self.program_for(action.domain());
        self.run(program, invocation)
    }

    /// Name of the checked-out branch, used to fill in a missing target.
    pub fn current_branch(&self) -> Result<String, ExecutionResult> {
        let invocation = Invocation::new(["rev-parse", "--abbrev-ref", "HEAD"]);
        let result = self.run(&self.programs.git, &invocation);
        let branch = result.stdout.trim();

        if !result.succeeded || branch.is_empty() || branch == "HEAD" {
            return Err(result);
        }

        Ok(branch.to_string())
    }

    fn run(&self, program: &str, invocation: &Invocation) -> ExecutionResult {
        let command_line = if invocation.args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, invocation.args.join(" "))
        };

        let mut cmd = Command::new(program);
        cmd.args(&invocation.args).current_dir(&self.working_dir);

        if invocation.stream {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }

        debug!(command = %command_line, "spawning");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(program, err = %e, "failed to spawn");
                return ExecutionResult::unavailable(
                    program,
                    command_line,
                    format!("Failed to execute {}: {}", program, e),
                );
            }
        };

        let stdout_handle = child.stdout.take().map(|pipe| thread::spawn(move || drain(pipe)));
        let stderr_handle = child.stderr.take().map(|pipe| thread::spawn(move || drain(pipe)));

        let waited = self.wait(&mut child);

        let stdout = join_output(stdout_handle);
        let stderr = join_output(stderr_handle);

        let (exit_code, mut failure) = match waited {
            Ok(Waited::Exited(status)) => {
                let failure = (!status.success()).then_some(Failure::Exited);
                (status.code(), failure)
            }
            Ok(Waited::TimedOut(status, limit)) => (status.and_then(|s| s.code()), Some(Failure::TimedOut(limit))),
            Err(e) => (None, Some(Failure::Interrupted(e.to_string()))),
        };

        let mut parsed = None;
        if failure.is_none() {
            match invocation.parser.parse(&stdout) {
                Ok(output) => parsed = output,
                Err(detail) => {
                    warn!(command = %command_line, detail = %detail, "unparsable output");
                    failure = Some(Failure::Unparsable(detail));
                }
            }
        }

        debug!(command = %command_line, exit_code = ?exit_code, failed = failure.is_some(), "finished");

        ExecutionResult {
            program: program.to_string(),
            command: command_line,
            succeeded: failure.is_none(),
            stdout,
            stderr,
            exit_code,
            failure,
            parsed,
        }
    }

    fn wait(&self, child: &mut Child) -> std::io::Result<Waited> {
        let Some(limit) = self.timeout else {
            return child.wait().map(Waited::Exited);
        };

        match child.wait_timeout(limit)? {
            Some(status) => Ok(Waited::Exited(status)),
            None => {
                warn!(timeout_secs = limit.as_secs(), "command timed out, killing");
                Ok(Waited::TimedOut(stop(child)?, limit))
            }
        }
    }
}

/// Kill a child and reap it. A child that exited on its own between the
/// timeout and the kill reports `InvalidInput`; its status is still collected.
fn stop(child: &mut Child) -> std::io::Result<Option<ExitStatus>> {
    if let Err(e) = child.kill() {
        if e.kind() != std::io::ErrorKind::InvalidInput {
            return Err(e);
        }
        debug!("child exited before it could be killed");
    }
    Ok(child.wait().ok())
}

enum Waited {
    Exited(ExitStatus),
    TimedOut(Option<ExitStatus>, Duration),
}

fn drain<R: Read>(mut pipe: R) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Err(e) = pipe.read_to_end(&mut buf) {
        warn!(err = %e, "failed reading child output");
    }
    buf
}

fn join_output(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .map(|h| h.join().unwrap_or_default())
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
        .unwrap_or_default()
}
