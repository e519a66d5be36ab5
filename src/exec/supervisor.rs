// src/exec/supervisor.rs

//! Supervision of the single `sam local` child process.
//!
//! [`spawn_process`] starts the child, forwards every output chunk to an
//! [`OutputSink`] and only returns once the readiness marker was seen. The
//! returned [`ProcessHandle`] owns the background task that waits for the
//! child to exit.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{Result, SamLocalError};
use crate::events::Topic;
use crate::exec::scanner::MarkerScanner;
use crate::exec::signal::Completion;

/// Printed by `sam local` once it accepts connections.
pub const READY_MARKER: &str = "Press CTRL+C to quit";

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// How long to keep draining output after the child exited.
///
/// Grandchildren (docker) may inherit the pipes and keep them open.
const READER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Receiver of raw output chunks.
pub trait OutputSink: Send + Sync {
    fn emit(&self, topic: Topic, chunk: &[u8]);
}

/// Lifecycle of a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Starting,
    Running,
    Terminating,
    Exited,
}

/// What to run.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub ready_marker: String,
}

impl SpawnRequest {
    pub fn new(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.into(),
            ready_marker: READY_MARKER.to_string(),
        }
    }

    pub fn with_ready_marker(mut self, marker: impl Into<String>) -> Self {
        self.ready_marker = marker.into();
        self
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<ProcessState>,
    status: Mutex<Option<ExitStatus>>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, ProcessState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn status(&self) -> MutexGuard<'_, Option<ExitStatus>> {
        self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle to a running child that has reported readiness.
///
/// Dropping the handle kills the child.
#[derive(Debug)]
pub struct ProcessHandle {
    program: String,
    pid: Option<u32>,
    shared: Arc<Shared>,
    ready: Completion,
    exited: Completion,
    kill_tx: Option<oneshot::Sender<()>>,
    waiter: JoinHandle<()>,
}

impl ProcessHandle {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn state(&self) -> ProcessState {
        *self.shared.state()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_fired()
    }

    pub fn has_exited(&self) -> bool {
        self.exited.is_fired()
    }

    pub fn exit_status(&self) -> Option<ExitStatus> {
        *self.shared.status()
    }

    /// Wait for the child to exit on its own.
    pub async fn wait(&self) -> Option<ExitStatus> {
        self.exited.wait().await;
        self.exit_status()
    }

    /// Terminate the child and wait until it has exited.
    pub async fn kill(mut self) -> Result<Option<ExitStatus>> {
        info!(program = %self.program, pid = ?self.pid, "stopping process");

        if let Some(tx) = self.kill_tx.take() {
            if tx.send(()).is_err() {
                debug!(program = %self.program, "process already exited before kill");
            }
        }

        (&mut self.waiter)
            .await
            .map_err(|e| anyhow::anyhow!("process supervisor task failed: {e}"))?;

        Ok(self.exit_status())
    }
}

/// Spawn `request` and wait until it prints its readiness marker.
///
/// Fails with [`SamLocalError::StartupFailed`] if the process exits first.
pub async fn spawn_process(
    request: SpawnRequest,
    sink: Arc<dyn OutputSink>,
) -> Result<ProcessHandle> {
    info!(
        program = %request.program,
        args = ?request.args,
        cwd = %request.cwd.display(),
        "spawning process"
    );

    let mut cmd = Command::new(&request.program);
    cmd.args(&request.args)
        .current_dir(&request.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| SamLocalError::Spawn {
        program: request.program.clone(),
        source,
    })?;
    let pid = child.id();

    let shared = Arc::new(Shared {
        state: Mutex::new(ProcessState::Starting),
        status: Mutex::new(None),
    });
    let ready = Completion::new();
    let exited = Completion::new();

    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_reader(
            stdout,
            Topic::Data,
            &request.ready_marker,
            ready.clone(),
            Arc::clone(&shared),
            Arc::clone(&sink),
        ));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_reader(
            stderr,
            Topic::Error,
            &request.ready_marker,
            ready.clone(),
            Arc::clone(&shared),
            Arc::clone(&sink),
        ));
    }

    let (kill_tx, kill_rx) = oneshot::channel();
    let waiter = tokio::spawn(supervise(
        child,
        readers,
        kill_rx,
        request.program.clone(),
        Arc::clone(&shared),
        exited.clone(),
        sink,
    ));

    tokio::select! {
        biased;
        _ = ready.wait() => {}
        _ = exited.wait() => {}
    }

    if !ready.is_fired() {
        let status = *shared.status();
        warn!(program = %request.program, ?status, "process exited before becoming ready");
        return Err(SamLocalError::StartupFailed {
            program: request.program,
            status,
        });
    }

    info!(program = %request.program, pid = ?pid, "process is ready");

    Ok(ProcessHandle {
        program: request.program,
        pid,
        shared,
        ready,
        exited,
        kill_tx: Some(kill_tx),
        waiter,
    })
}

fn mark_running(shared: &Shared) {
    let mut state = shared.state();
    if *state == ProcessState::Starting {
        *state = ProcessState::Running;
    }
}

fn spawn_reader<R>(
    mut reader: R,
    topic: Topic,
    marker: &str,
    ready: Completion,
    shared: Arc<Shared>,
    sink: Arc<dyn OutputSink>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut scanner = MarkerScanner::new(marker);

    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    let chunk = &buf[..n];
                    sink.emit(topic, chunk);
                    if scanner.feed(chunk) && ready.fire() {
                        // Before the exit waiter can look at the state.
                        mark_running(&shared);
                        debug!(?topic, "readiness marker observed");
                    }
                }
                Err(e) => {
                    warn!(?topic, error = %e, "failed to read process output");
                    break;
                }
            }
        }
        debug!(?topic, "output reader ended");
    })
}

async fn supervise(
    mut child: Child,
    readers: Vec<JoinHandle<()>>,
    kill_rx: oneshot::Receiver<()>,
    program: String,
    shared: Arc<Shared>,
    exited: Completion,
    sink: Arc<dyn OutputSink>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        request = kill_rx => {
            if request.is_err() {
                debug!(program = %program, "process handle dropped; killing process");
            }
            *shared.state() = ProcessState::Terminating;
            if let Err(e) = child.start_kill() {
                warn!(program = %program, error = %e, "failed to send kill signal");
            }
            child.wait().await
        }
    };

    for reader in readers {
        if tokio::time::timeout(READER_DRAIN_TIMEOUT, reader).await.is_err() {
            debug!(program = %program, "output pipe still open after exit; detaching reader");
        }
    }

    let previous = std::mem::replace(&mut *shared.state(), ProcessState::Exited);

    match status {
        Ok(status) => {
            *shared.status() = Some(status);
            info!(program = %program, exit_code = ?status.code(), success = status.success(), "process exited");

            if previous == ProcessState::Running && !status.success() {
                let message = format!("{program} exited unexpectedly ({status})\n");
                sink.emit(Topic::Error, message.as_bytes());
            }
        }
        Err(e) => {
            warn!(program = %program, error = %e, "failed to wait for process");
        }
    }

    exited.fire();
}
