//! External command execution with a timeout.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{NsplanError, Result};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long output readers may lag behind an exited child before they are abandoned.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Result of executing an external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timed out).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed after exceeding its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// One-line description of a failed run, for error messages.
    pub fn failure_summary(&self) -> String {
        if self.timed_out {
            return format!("timed out after {}s", self.duration.as_secs());
        }

        let detail = self
            .stderr
            .lines()
            .chain(self.stdout.lines())
            .map(str::trim)
            .find(|l| !l.is_empty());

        match (self.exit_code, detail) {
            (Some(code), Some(line)) => format!("exit code {}: {}", code, line),
            (Some(code), None) => format!("exit code {}", code),
            (None, Some(line)) => format!("terminated by signal: {}", line),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

/// Split a configured command like `sudo netplan` into program and leading args.
pub fn split_command(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Run `program args..`, killing it if it outlives `timeout`.
///
/// A program that cannot be spawned is an error; a non-zero exit or a
/// timeout is reported in the returned [`CommandResult`].
pub fn run_with_timeout(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<CommandResult> {
    let cmdline = std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!("Running `{}` (timeout {:?})", cmdline, timeout);

    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }
    // Own process group, so a timeout can take helpers like `sudo` children down too.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|e| {
        tracing::debug!("Failed to spawn `{}`: {}", cmdline, e);
        NsplanError::CommandFailed {
            command: cmdline.clone(),
            code: None,
        }
    })?;

    let stdout_handle = drain(child.stdout.take());
    let stderr_handle = drain(child.stderr.take());

    let (exit_code, timed_out) = wait_with_deadline(&mut child, start + timeout, &cmdline)?;

    // Readers get until the deadline, and at least a short grace once the child is gone.
    let drain_deadline = (start + timeout).max(Instant::now() + DRAIN_GRACE);
    let stdout = collect_by(stdout_handle, drain_deadline);
    let stderr = collect_by(stderr_handle, drain_deadline);
    let duration = start.elapsed();

    let result = CommandResult {
        exit_code,
        stdout,
        stderr,
        duration,
        success: !timed_out && exit_code == Some(0),
        timed_out,
    };

    tracing::debug!(
        "`{}` finished in {:?} (exit {:?}, timed out: {})",
        cmdline,
        result.duration,
        result.exit_code,
        result.timed_out
    );

    Ok(result)
}

/// Read a pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Join a reader unless it is still blocked at `deadline`.
///
/// A descendant that escaped the process group, or was left running in
/// the background, can hold the pipe open indefinitely; its output is
/// dropped rather than waited for.
fn collect_by(handle: JoinHandle<String>, deadline: Instant) -> String {
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            tracing::debug!("Abandoning output still held open by a descendant");
            return String::new();
        }
        thread::sleep(POLL_INTERVAL);
    }
    handle.join().unwrap_or_default()
}

/// Kill the child and every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: killpg only sends a signal; the group was created at spawn.
            unsafe {
                libc::killpg(pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
    cmdline: &str,
) -> Result<(Option<i32>, bool)> {
    loop {
        match child.try_wait()? {
            Some(status) => return Ok((status.code(), false)),
            None if Instant::now() >= deadline => {
                tracing::warn!("`{}` exceeded its timeout, killing it", cmdline);
                kill_tree(child);
                return Ok((None, true));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}
