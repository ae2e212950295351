//! Spawning the cluster-management tool and collecting its output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::completion::Completion;
use crate::error::{Error, ExecutionError, Result};
use crate::{CommandRunner, CommandSpec};

const DEFAULT_EXECUTABLE: &str = "ccm";

/// How long output readers may keep draining after the process has exited.
///
/// Nodes started by the tool can inherit its pipes and keep them open long
/// after the tool itself is gone.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

type OutputBuffer = Arc<Mutex<Vec<String>>>;

/// Outcome of a single tool invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code of the process. `-1` if it was terminated by a signal.
    pub exit_code: i32,

    /// Standard output, one entry per line, in arrival order.
    pub stdout: Vec<String>,

    /// Standard error, one entry per line, in arrival order.
    pub stderr: Vec<String>,
}

impl ExecutionResult {
    /// Returns whether the process exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns stdout as a single newline-separated string.
    #[must_use]
    pub fn stdout_text(&self) -> String {
        self.stdout.join("\n")
    }

    /// Returns stderr as a single newline-separated string.
    #[must_use]
    pub fn stderr_text(&self) -> String {
        self.stderr.join("\n")
    }
}

#[derive(Clone, Copy, Debug)]
enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Runs the cluster-management tool as a child process.
#[derive(Clone, Debug)]
pub struct ProcessExecutor {
    executable: PathBuf,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE)
    }
}

impl ProcessExecutor {
    /// Creates a new `ProcessExecutor` for the given executable.
    #[must_use]
    pub fn new<P: AsRef<Path>>(executable: P) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
        }
    }

    /// Returns the executable this executor runs.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Runs the tool with the given arguments and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] if the process exits with a non-zero code,
    /// [`Error::Io`] if it cannot be spawned or waited on, and
    /// [`Error::Abandoned`] if the exit was never reported.
    pub async fn execute(&self, command: &CommandSpec) -> Result<ExecutionResult> {
        let mut cmd = Command::new(&self.executable);
        cmd.args(command.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("running {} {}", self.executable.display(), command);

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Io("failed to spawn process", e))?;

        // Stdin stays open until the process has exited.
        let stdin = child.stdin.take();

        let stdout_buffer = OutputBuffer::default();
        let stderr_buffer = OutputBuffer::default();
        let drain_token = CancellationToken::new();
        let task_tracker = TaskTracker::new();

        if let Some(stdout) = child.stdout.take() {
            task_tracker.spawn(collect_lines(
                stdout,
                Stream::Stdout,
                Arc::clone(&stdout_buffer),
                drain_token.child_token(),
            ));
        }

        if let Some(stderr) = child.stderr.take() {
            task_tracker.spawn(collect_lines(
                stderr,
                Stream::Stderr,
                Arc::clone(&stderr_buffer),
                drain_token.child_token(),
            ));
        }

        task_tracker.close();

        let (completion, exited) = Completion::channel();
        tokio::spawn(async move {
            let status = child.wait().await;
            drop(stdin);
            completion.settle(status);
        });

        let status = exited
            .await
            .map_err(|_| Error::Abandoned)?
            .map_err(|e| Error::Io("failed to wait for process", e))?;

        if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, task_tracker.wait())
            .await
            .is_err()
        {
            debug!("output of `{}` still open after exit, not waiting for it", command);
            drain_token.cancel();
            task_tracker.wait().await;
        }

        let result = ExecutionResult {
            exit_code: exit_code(status),
            stdout: std::mem::take(&mut *stdout_buffer.lock()),
            stderr: std::mem::take(&mut *stderr_buffer.lock()),
        };

        debug!("`{}` exited with code {}", command, result.exit_code);

        ExecutionError::check(result).map_err(Error::from)
    }

    /// Runs the tool in the background, discarding the result.
    pub fn execute_detached(&self, command: CommandSpec) -> tokio::task::JoinHandle<()> {
        CommandRunner::execute_detached(Arc::new(self.clone()), command)
    }
}

#[async_trait]
impl CommandRunner for ProcessExecutor {
    async fn execute(&self, command: &CommandSpec) -> Result<ExecutionResult> {
        Self::execute(self, command).await
    }
}

async fn collect_lines<R>(
    reader: R,
    stream: Stream,
    buffer: OutputBuffer,
    drain_token: CancellationToken,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut segments = BufReader::new(reader).split(b'\n');

    loop {
        let segment = tokio::select! {
            segment = segments.next_segment() => segment,
            () = drain_token.cancelled() => break,
        };

        match segment {
            Ok(Some(bytes)) => {
                let mut line = String::from_utf8_lossy(&bytes).into_owned();
                if line.ends_with('\r') {
                    line.pop();
                }

                match stream {
                    Stream::Stdout => debug!(target: "ccm", "{}", line),
                    Stream::Stderr => warn!(target: "ccm", "{}", line),
                }

                buffer.lock().push(line);
            }
            Ok(None) => break,
            Err(e) => {
                warn!("failed to read process {}: {}", stream, e);
                break;
            }
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or_else(|| {
        warn!("process terminated without exit code: {}", status);
        -1
    })
}
