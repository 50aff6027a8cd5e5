//! Bounded command execution.
//!
//! Provides [`run_cmd`], which spawns one external command with its stdout
//! and stderr captured into spooled buffers and a wall-clock timeout on the
//! whole run. The runner calls this for every compile/execute step, so the
//! contract is deliberately small: one child per call, no retry, no
//! streaming.

use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::SpooledTempFile;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Timeout applied when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Spool threshold for captured stdout; larger output rolls to a temp file.
const STDOUT_SPOOL_BYTES: usize = 16 * 1024;

/// Spool threshold for captured stderr.
const STDERR_SPOOL_BYTES: usize = 1024;

/// How long a timed-out child gets to act on the terminate signal before
/// it is forcefully killed.
const TERM_GRACE: Duration = Duration::from_millis(500);

/// Captured outcome of a single command run.
///
/// Owned by the caller and discarded after use. An `exit_code` of `-1` with
/// empty output means the child ran but its outcome could not be observed
/// (a wait or capture-read failure, already logged).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmdOutput {
    /// Process exit code (`-1` if killed by a signal or unobservable).
    pub exit_code: i32,
    /// Captured stdout, one entry per line, trailing whitespace stripped.
    pub stdout: Vec<String>,
    /// Captured stderr, same shape as `stdout`.
    pub stderr: Vec<String>,
}

impl CmdOutput {
    /// Sentinel result for runs whose outcome could not be observed.
    fn unobserved() -> Self {
        Self {
            exit_code: -1,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }
}

/// Errors from [`run_cmd`].
///
/// A non-zero exit from the child is not an error here; it comes back as the
/// exit code in [`CmdOutput`] for the caller to interpret.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The argument vector was empty.
    #[error("empty command")]
    EmptyCommand,

    /// The command could not be launched at all (missing executable,
    /// permission denied, bad working directory).
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command outlived its timeout and was asked to terminate.
    /// Expected and non-fatal; callers decide whether it fails the case.
    #[error("`{command}` timed out after {limit:?}")]
    Timeout { command: String, limit: Duration },
}

/// Run `command` in `working_dir`, capturing stdout/stderr line by line.
///
/// The first element is the program, the rest its arguments; nothing is
/// passed through a shell. `timeout` of `None` lets the command run
/// arbitrarily long.
///
/// # Examples
///
/// ```no_run
/// # async fn demo() -> Result<(), caserun::exec::ExecError> {
/// use caserun::exec::{run_cmd, DEFAULT_TIMEOUT};
///
/// let cmd = vec!["echo".to_string(), "hello".to_string()];
/// let out = run_cmd(&cmd, ".".as_ref(), Some(DEFAULT_TIMEOUT)).await?;
/// assert_eq!(out.exit_code, 0);
/// assert_eq!(out.stdout, vec!["hello"]);
/// # Ok(())
/// # }
/// ```
pub async fn run_cmd(
    command: &[String],
    working_dir: &Path,
    timeout: Option<Duration>,
) -> Result<CmdOutput, ExecError> {
    let (program, args) = command.split_first().ok_or(ExecError::EmptyCommand)?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // Backstop for callers cancelling the whole future: a child still
        // alive when dropped is killed. The timeout path reaps explicitly.
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        command: command.join(" "),
        source,
    })?;

    // Drain both pipes in their own tasks so `child.wait()` can run
    // concurrently without deadlocking on a full pipe.
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let stdout_task = tokio::spawn(capture(stdout_pipe, STDOUT_SPOOL_BYTES));
    let stderr_task = tokio::spawn(capture(stderr_pipe, STDERR_SPOOL_BYTES));

    let waited = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(waited) => waited,
            Err(_elapsed) => {
                terminate(&mut child);
                // Let the child act on the signal, then kill whatever is
                // left and reap it so no zombie survives the call.
                if tokio::time::timeout(TERM_GRACE, child.wait()).await.is_err() {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                }
                // Dropping the capture tasks releases both spool buffers.
                stdout_task.abort();
                stderr_task.abort();
                return Err(ExecError::Timeout {
                    command: command.join(" "),
                    limit,
                });
            }
        },
        None => child.wait().await,
    };

    let status = match waited {
        Ok(status) => status,
        Err(err) => {
            tracing::error!(command = %command.join(" "), %err, "wait on child failed");
            return Ok(CmdOutput::unobserved());
        }
    };

    let stdout = match stdout_task.await {
        Ok(Ok(spool)) => spool,
        Ok(Err(err)) => {
            tracing::error!(command = %command.join(" "), %err, "stdout capture failed");
            return Ok(CmdOutput::unobserved());
        }
        Err(join_err) => {
            tracing::error!(command = %command.join(" "), %join_err, "stdout task failed");
            return Ok(CmdOutput::unobserved());
        }
    };
    let stderr = match stderr_task.await {
        Ok(Ok(spool)) => spool,
        Ok(Err(err)) => {
            tracing::error!(command = %command.join(" "), %err, "stderr capture failed");
            return Ok(CmdOutput::unobserved());
        }
        Err(join_err) => {
            tracing::error!(command = %command.join(" "), %join_err, "stderr task failed");
            return Ok(CmdOutput::unobserved());
        }
    };

    let (stdout, stderr) = match (read_lines(stdout), read_lines(stderr)) {
        (Ok(out), Ok(err)) => (out, err),
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!(command = %command.join(" "), %err, "reading capture buffer failed");
            return Ok(CmdOutput::unobserved());
        }
    };

    Ok(CmdOutput {
        exit_code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}

/// Ask the child to terminate gracefully.
///
/// SIGTERM on Unix so the child can clean up; elsewhere the best available
/// primitive is an immediate kill.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGTERM);
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }
}

/// Drain one output stream into a spooled buffer.
///
/// The buffer stays in memory up to `spool_limit` bytes and transparently
/// rolls over to an anonymous temp file past that.
async fn capture<R>(stream: Option<R>, spool_limit: usize) -> std::io::Result<SpooledTempFile>
where
    R: AsyncRead + Unpin,
{
    let mut spool = SpooledTempFile::new(spool_limit);
    if let Some(mut stream) = stream {
        let mut chunk = [0u8; 8192];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            spool.write_all(&chunk[..n])?;
        }
    }
    Ok(spool)
}

/// Read a capture buffer back as lines, lossily decoded, trailing
/// whitespace stripped.
fn read_lines(mut spool: SpooledTempFile) -> std::io::Result<Vec<String>> {
    spool.seek(SeekFrom::Start(0))?;
    let mut lines = Vec::new();
    for segment in BufReader::new(spool).split(b'\n') {
        let bytes = segment?;
        lines.push(String::from_utf8_lossy(&bytes).trim_end().to_string());
    }
    Ok(lines)
}
