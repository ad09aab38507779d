//! Child process execution with a wall-clock ceiling.
//!
//! The child runs in its own process group so a timeout can take down the
//! wrapper script together with the JVM it starts. Stdout and stderr are
//! drained on helper threads; the calling thread polls until the child has
//! exited and both pipes are closed, or the ceiling expires.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What happened to a spawned process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutput {
    /// The process exited on its own.
    Exited {
        /// Exit code; `None` when killed by a signal.
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The ceiling expired and the process group was killed.
    TimedOut,
}

/// Runs an external program. Implemented by [`ProcessExecutor`]; tests swap
/// in scripted executors.
pub trait CommandExecutor {
    /// Run `program` with `args`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the program cannot be spawned or waited on.
    fn execute(&self, program: &Path, args: &[String], timeout: Duration)
    -> io::Result<ProcessOutput>;
}

/// Executes real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    fn execute(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> io::Result<ProcessOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let start = Instant::now();
        let mut child = cmd.spawn()?;
        debug!(pid = child.id(), program = %program.display(), "Spawned benchmark process");

        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());
        let deadline = start + timeout;
        let mut exit_status = None;

        // The ceiling covers the readers too: a grandchild that inherited the
        // pipes keeps them open after the direct child exits.
        loop {
            if exit_status.is_none() {
                match child.try_wait() {
                    Ok(status) => exit_status = status,
                    Err(e) => {
                        kill_process_group(&mut child);
                        let _ = child.wait();
                        return Err(e);
                    }
                }
            }

            let drained =
                reader_done(stdout_reader.as_ref()) && reader_done(stderr_reader.as_ref());
            if let (Some(status), true) = (exit_status, drained) {
                return Ok(ProcessOutput::Exited {
                    code: status.code(),
                    stdout: join_reader(stdout_reader),
                    stderr: join_reader(stderr_reader),
                });
            }

            if Instant::now() >= deadline {
                warn!(
                    pid = child.id(),
                    timeout_secs = timeout.as_secs(),
                    exited = exit_status.is_some(),
                    "Benchmark process exceeded timeout; killing process group"
                );
                kill_process_group(&mut child);
                if exit_status.is_none() {
                    let _ = child.wait();
                }
                // Readers are detached; they finish once the killed group
                // closes its pipes.
                return Ok(ProcessOutput::TimedOut);
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn reader_done(handle: Option<&JoinHandle<Vec<u8>>>) -> bool {
    handle.is_none_or(JoinHandle::is_finished)
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    match i32::try_from(child.id()) {
        Ok(pgid) => {
            // SAFETY: kill(2) has no memory-safety preconditions; a negative
            // pid targets the group created by `process_group(0)` above.
            #[allow(unsafe_code)]
            let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
            if rc != 0 {
                let _ = child.kill();
            }
        }
        Err(_) => {
            let _ = child.kill();
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}
