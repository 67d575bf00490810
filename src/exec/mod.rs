//! Interpreter subprocess execution.
//!
//! Spawns the requested interpreter, feeds it the wrapper program (on stdin
//! by default, via a uniquely-named temp file for dialects that cannot
//! execute from stdin), and captures stdout/stderr to completion with an
//! optional timeout. Child output goes to anonymous temp files rather than
//! pipes, so a chatty script cannot deadlock the capture.


use crate::error::{Result, SourceError};
use crate::wrapper::WrapperProgram;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Captured output of one interpreter run.
///
/// Created per call and discarded after parsing; never cached or reused.
/// `exit_code` here is the interpreter process's own status, which is
/// metadata only — the sourced script's status is recovered from the dump by
/// the parser.
#[derive(Debug)]
pub struct ExecutionResult {
    pub stdout: String,
    /// Diagnostic only; logged, never parsed.
    pub stderr: String,
    pub exit_code: i32,
}

/// Runs an interpreter argv to completion.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    timeout: Option<Duration>,
}

impl Executor {
    pub fn new() -> Self {
        Executor { timeout: None }
    }

    /// Bound the run by a wall-clock timeout; the child is killed when it
    /// elapses and the run fails with [`SourceError::Execution`].
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Executor { timeout }
    }

    /// Execute the wrapper program under `interpreter` (first token is the
    /// executable, the rest are flags) and capture its output.
    ///
    /// The sourced script's own failure is not an error here; only spawn
    /// failures, timeouts, and signal deaths are.
    pub fn run(
        &self,
        interpreter: &[String],
        program: &WrapperProgram,
        pipe_stdin: bool,
    ) -> Result<ExecutionResult> {
        let executable = interpreter.first().ok_or_else(|| {
            SourceError::Configuration("interpreter command is empty".to_string())
        })?;

        // Held until after wait so the temp file outlives the child.
        let mut program_file = None;
        let mut command = Command::new(executable);
        command.args(&interpreter[1..]);

        if pipe_stdin {
            command.stdin(Stdio::piped());
        } else {
            let mut file = tempfile::NamedTempFile::new().map_err(|e| {
                SourceError::Execution(format!("failed to create wrapper temp file: {}", e))
            })?;
            file.write_all(program.text().as_bytes())
                .and_then(|_| file.flush())
                .map_err(|e| {
                    SourceError::Execution(format!("failed to write wrapper temp file: {}", e))
                })?;
            command.arg(file.path());
            command.stdin(Stdio::null());
            program_file = Some(file);
        }

        let mut stdout_capture = capture_file()?;
        let mut stderr_capture = capture_file()?;
        command
            .stdout(Stdio::from(clone_capture(&stdout_capture)?))
            .stderr(Stdio::from(clone_capture(&stderr_capture)?));

        let mut child = command.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::InterpreterNotFound(executable.clone()),
            _ => SourceError::Execution(format!("failed to spawn '{}': {}", executable, e)),
        })?;

        if pipe_stdin {
            if let Some(mut stdin) = child.stdin.take() {
                match stdin.write_all(program.text().as_bytes()) {
                    // A shell that exits before reading all of stdin is not
                    // a spawn failure; the parser reports what's missing.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                    Err(e) => {
                        kill_process(&mut child);
                        return Err(SourceError::Execution(format!(
                            "failed to write wrapper program to '{}': {}",
                            executable, e
                        )));
                    }
                    Ok(()) => {}
                }
            }
        }

        let status = wait_with_timeout(&mut child, self.timeout)?;
        drop(program_file);

        let exit_code = status.ok_or_else(|| {
            SourceError::Execution(format!(
                "interpreter '{}' was terminated by a signal",
                executable
            ))
        })?;

        Ok(ExecutionResult {
            stdout: read_capture(&mut stdout_capture)?,
            stderr: read_capture(&mut stderr_capture)?,
            exit_code,
        })
    }
}

fn capture_file() -> Result<File> {
    tempfile::tempfile()
        .map_err(|e| SourceError::Execution(format!("failed to create capture file: {}", e)))
}

fn clone_capture(file: &File) -> Result<File> {
    file.try_clone()
        .map_err(|e| SourceError::Execution(format!("failed to clone capture file: {}", e)))
}

fn read_capture(file: &mut File) -> Result<String> {
    let mut text = String::new();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_string(&mut text))
        .map_err(|e| SourceError::Execution(format!("failed to read captured output: {}", e)))?;
    Ok(text)
}

/// Wait for the child, polling so a timeout can kill it.
///
/// Returns the exit code, or `None` if the child died on a signal.
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<Option<i32>> {
    let Some(timeout) = timeout else {
        let status = child.wait().map_err(|e| {
            SourceError::Execution(format!("failed to wait for interpreter: {}", e))
        })?;
        return Ok(status.code());
    };

    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status.code()),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Err(SourceError::Execution(format!(
                        "interpreter timed out after {:?}",
                        timeout
                    )));
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(SourceError::Execution(format!(
                    "failed to check interpreter status: {}",
                    e
                )));
            }
        }
    }
}

/// Kill a process and reap it.
fn kill_process(child: &mut Child) {
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}
