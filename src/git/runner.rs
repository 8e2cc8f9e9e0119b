//! Run one engine invocation to completion, a deadline, or cancellation.
//!
//! Both pipes are drained on reader threads so a chatty child never blocks on
//! a full pipe while the caller polls for exit. The captured text is stdout
//! followed by stderr; parsers treat stray diagnostic lines as noise.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::command::{GitCommand, GIT_DIR_ENV};
use crate::BrowseError;

/// How often a running child is checked for exit, deadline and cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Shared "caller went away" signal. Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Execute `cmd` and return its merged output.
///
/// Non-zero exit is an [`BrowseError::EngineExecution`] carrying the output.
/// With `timeout` set, a child still running at the deadline is killed.
pub fn run(
    cmd: &GitCommand,
    timeout: Option<Duration>,
    cancel: &CancelFlag,
) -> Result<String, BrowseError> {
    let rendered = cmd.to_shell_string();
    debug!(command = %rendered, "running engine");
    let start = Instant::now();

    let mut child = Command::new(&cmd.program)
        .args(&cmd.args)
        .env(GIT_DIR_ENV, &cmd.git_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| BrowseError::EngineSpawn {
            command: rendered.clone(),
            source,
        })?;

    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let status = wait_with_deadline(&mut child, &rendered, timeout, cancel)?;

    let mut output = join_reader(stdout);
    let diagnostics = join_reader(stderr);
    if !diagnostics.is_empty() {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&diagnostics);
    }

    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!(command = %rendered, elapsed_ms, bytes = output.len(), "engine finished");

    if !status.success() {
        return Err(BrowseError::EngineExecution {
            command: rendered,
            status: status.to_string(),
            output: output.trim().to_string(),
        });
    }
    Ok(output)
}

fn wait_with_deadline(
    child: &mut Child,
    rendered: &str,
    timeout: Option<Duration>,
    cancel: &CancelFlag,
) -> Result<ExitStatus, BrowseError> {
    let deadline = timeout.map(|t| Instant::now() + t);
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if cancel.is_cancelled() {
            kill_and_reap(child, rendered);
            return Err(BrowseError::Cancelled {
                command: rendered.to_string(),
            });
        }
        if let (Some(deadline), Some(timeout)) = (deadline, timeout) {
            if Instant::now() >= deadline {
                let timeout_ms = timeout.as_millis() as u64;
                warn!(command = %rendered, timeout_ms, "engine timed out, killing");
                kill_and_reap(child, rendered);
                return Err(BrowseError::EngineTimeout {
                    command: rendered.to_string(),
                    timeout_ms,
                });
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill_and_reap(child: &mut Child, rendered: &str) {
    if let Err(e) = child.kill() {
        warn!(command = %rendered, error = %e, "failed to kill engine process");
    }
    // Reap so the child does not linger as a zombie.
    let _ = child.wait();
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    match handle.map(|h| h.join()) {
        Some(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Some(Err(_)) => {
            warn!("engine output reader panicked");
            String::new()
        }
        None => String::new(),
    }
}
