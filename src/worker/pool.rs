use std::ffi::OsString;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::foundation::error::{PlasmaError, PlasmaResult};
use crate::protocol::stream::{Incoming, read_result, write_task};
use crate::protocol::wire::{ResultHeader, Task};

/// How to launch one worker process.
///
/// The worker must speak the task/result protocol on its stdin/stdout. Its stderr is inherited so
/// worker logs end up next to the coordinator's.
#[derive(Clone, Debug)]
pub struct WorkerCommand {
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments passed to every worker.
    pub args: Vec<OsString>,
}

impl WorkerCommand {
    /// Run `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Re-run the current executable with the `worker` subcommand.
    pub fn current_exe() -> PlasmaResult<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| PlasmaError::spawn(format!("cannot locate current executable: {e}")))?;
        Ok(Self::new(exe).arg("worker"))
    }
}

/// Something a worker's output stream produced.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A well-formed result.
    Result {
        /// Worker slot the result came from.
        worker: usize,
        /// Validated header.
        header: ResultHeader,
        /// RGBA8 payload of exactly `width * height * 4` bytes.
        payload: Vec<u8>,
    },
    /// A result whose payload size broke the contract. The payload was skipped.
    Malformed {
        /// Worker slot the result came from.
        worker: usize,
        /// Offending header.
        header: ResultHeader,
    },
    /// The worker's output stream ended or failed. No further events follow for this slot.
    Disconnected {
        /// Worker slot that went away.
        worker: usize,
        /// Failure description; `None` for a clean end-of-stream.
        reason: Option<String>,
    },
}

impl WorkerEvent {
    /// Worker slot this event belongs to.
    pub fn worker(&self) -> usize {
        match self {
            Self::Result { worker, .. }
            | Self::Malformed { worker, .. }
            | Self::Disconnected { worker, .. } => *worker,
        }
    }
}

/// Task side of a worker pool, as seen by the dispatcher.
pub trait TaskSubmit {
    /// Number of worker slots (live or not).
    fn worker_count(&self) -> usize;

    /// Send `task` to worker `worker`.
    ///
    /// A [`PlasmaError::Connection`] means the slot is unusable from now on.
    fn submit(&mut self, worker: usize, task: &Task) -> PlasmaResult<()>;
}

/// Result side of a worker pool, as seen by the event loop.
pub trait EventSource {
    /// Wait up to `timeout` for the next worker event.
    fn next_event(&mut self, timeout: Duration) -> Option<WorkerEvent>;
}

struct WorkerHandle {
    child: Child,
    stdin: Option<ChildStdin>,
    reader: Option<JoinHandle<()>>,
}

/// Fixed-size set of worker processes, one pipe pair each, alive for the pool's lifetime.
///
/// Every worker gets a reader thread that blocks on its stdout and forwards decoded results as
/// [`WorkerEvent`]s over one shared channel, so the coordinator can wait on all workers at once
/// without blocking on any single one.
pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    events: Option<Receiver<WorkerEvent>>,
}

impl WorkerPool {
    /// Spawn `count` workers.
    ///
    /// Failing to start any worker is fatal: workers started so far are killed and reaped, and
    /// no pool is returned.
    #[tracing::instrument(skip(cmd), fields(program = %cmd.program.display()))]
    pub fn spawn(cmd: &WorkerCommand, count: usize) -> PlasmaResult<Self> {
        if count == 0 {
            return Err(PlasmaError::validation("worker pool needs at least one worker"));
        }

        let (tx, rx) = mpsc::channel();
        let mut pool = Self {
            workers: Vec::with_capacity(count),
            events: Some(rx),
        };
        for index in 0..count {
            match spawn_worker(cmd, index, tx.clone()) {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    tracing::error!(worker = index, error = %e, "worker spawn failed");
                    pool.kill_all();
                    return Err(e);
                }
            }
        }

        tracing::info!(workers = count, "worker pool started");
        Ok(pool)
    }

    /// Number of worker slots.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Return `true` when the pool has no workers (only after shutdown).
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// OS process ids of the workers, in slot order.
    pub fn pids(&self) -> Vec<u32> {
        self.workers.iter().map(|w| w.child.id()).collect()
    }

    /// Wait up to `timeout` for any worker's output to become readable and return what it
    /// produced. `None` on timeout or once every reader has finished.
    pub fn poll_readable(&self, timeout: Duration) -> Option<WorkerEvent> {
        let rx = self.events.as_ref()?;
        match rx.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Close every pipe and reap the workers.
    ///
    /// No signal is sent: each worker sees end-of-stream on its input and exits on its own. A
    /// worker still computing finishes its frame first; its result is dropped.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        for w in &mut self.workers {
            drop(w.stdin.take());
        }
        drop(self.events.take());
        for (index, mut w) in self.workers.drain(..).enumerate() {
            if let Some(reader) = w.reader.take()
                && reader.join().is_err()
            {
                tracing::warn!(worker = index, "reader thread panicked");
            }
            match w.child.wait() {
                Ok(status) => tracing::debug!(worker = index, %status, "worker exited"),
                Err(e) => tracing::warn!(worker = index, error = %e, "failed to reap worker"),
            }
        }
        tracing::info!("worker pool stopped");
    }

    fn kill_all(&mut self) {
        for w in &mut self.workers {
            drop(w.stdin.take());
            let _ = w.child.kill();
        }
        self.shutdown();
    }
}

impl TaskSubmit for WorkerPool {
    fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn submit(&mut self, worker: usize, task: &Task) -> PlasmaResult<()> {
        let handle = self.workers.get_mut(worker).ok_or_else(|| {
            PlasmaError::validation(format!("no worker slot {worker}"))
        })?;
        let Some(stdin) = handle.stdin.as_mut() else {
            return Err(PlasmaError::connection(format!(
                "worker {worker} input is closed"
            )));
        };
        if let Err(e) = write_task(stdin, task) {
            if e.is_connection() {
                handle.stdin = None;
            }
            return Err(e);
        }
        Ok(())
    }
}

impl EventSource for WorkerPool {
    fn next_event(&mut self, timeout: Duration) -> Option<WorkerEvent> {
        self.poll_readable(timeout)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_worker(
    cmd: &WorkerCommand,
    index: usize,
    tx: Sender<WorkerEvent>,
) -> PlasmaResult<WorkerHandle> {
    let mut child = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| {
            PlasmaError::spawn(format!(
                "failed to start worker {index} ('{}'): {e}",
                cmd.program.display()
            ))
        })?;

    let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(PlasmaError::spawn(format!(
            "worker {index} started without piped stdio"
        )));
    };

    let reader = std::thread::Builder::new()
        .name(format!("plasma-worker-{index}"))
        .spawn(move || read_worker_output(index, stdout, tx));
    let reader = match reader {
        Ok(r) => r,
        Err(e) => {
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            return Err(PlasmaError::spawn(format!(
                "failed to start reader thread for worker {index}: {e}"
            )));
        }
    };

    tracing::debug!(worker = index, pid = child.id(), "worker started");
    Ok(WorkerHandle {
        child,
        stdin: Some(stdin),
        reader: Some(reader),
    })
}

fn read_worker_output(worker: usize, stdout: ChildStdout, tx: Sender<WorkerEvent>) {
    let mut stream = BufReader::with_capacity(64 * 1024, stdout);
    loop {
        let event = match read_result(&mut stream) {
            Ok(Some(Incoming::Frame { header, payload })) => WorkerEvent::Result {
                worker,
                header,
                payload,
            },
            Ok(Some(Incoming::Malformed { header })) => WorkerEvent::Malformed { worker, header },
            Ok(None) => {
                let _ = tx.send(WorkerEvent::Disconnected {
                    worker,
                    reason: None,
                });
                return;
            }
            Err(e) => {
                let _ = tx.send(WorkerEvent::Disconnected {
                    worker,
                    reason: Some(e.to_string()),
                });
                return;
            }
        };
        if tx.send(event).is_err() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/worker/pool.rs"]
mod tests;
