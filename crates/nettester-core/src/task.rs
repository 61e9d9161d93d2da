//! Background probe execution.
//!
//! Each probe kind runs on at most one named worker thread. The worker
//! publishes its output exactly once through a write-once cell; the main loop
//! polls for it and never blocks, except in [`TaskRunner::shutdown`] which
//! waits for a bounded time and then detaches stragglers.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{NetTesterError, Result};

/// How long teardown waits for workers before detaching them.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The background operations the kiosk can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProbeKind {
    WifiScan,
    Reachability,
    CustomCommand,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 3] = [
        ProbeKind::WifiScan,
        ProbeKind::Reachability,
        ProbeKind::CustomCommand,
    ];

    /// Name of the worker thread.
    pub fn thread_name(self) -> &'static str {
        match self {
            ProbeKind::WifiScan => "probe-wifi",
            ProbeKind::Reachability => "probe-reach",
            ProbeKind::CustomCommand => "probe-command",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeKind::WifiScan => "wifi scan",
            ProbeKind::Reachability => "reachability check",
            ProbeKind::CustomCommand => "custom command",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
    Completed,
    Cancelled,
    TimedOut,
}

/// Cooperative cancellation flag shared between the main loop and a worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
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

struct BackgroundTask {
    state: TaskState,
    result: Arc<OnceLock<Vec<String>>>,
    started_at: Instant,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
    /// Whether `poll` has handed the result out at least once.
    delivered: bool,
}

/// Move a Running task to its final state once its worker has exited.
fn settle(kind: ProbeKind, task: &mut BackgroundTask, failure_line: &str) {
    if task.state != TaskState::Running {
        return;
    }
    if task.result.get().is_some() {
        task.state = TaskState::Completed;
        log::info!(
            "{kind} finished after {:.1}s",
            task.started_at.elapsed().as_secs_f32()
        );
        return;
    }
    let finished = task.handle.as_ref().is_none_or(JoinHandle::is_finished);
    if !finished {
        return;
    }
    let joined = task.handle.take().map(JoinHandle::join);
    if task.result.get().is_some() {
        task.state = TaskState::Completed;
    } else if let Some(Err(_)) = joined {
        log::error!("{kind} worker panicked");
        let _ = task.result.set(vec![failure_line.to_string()]);
        task.state = TaskState::Completed;
    } else if task.cancel.is_cancelled() {
        log::info!("{kind} cancelled");
        task.state = TaskState::Cancelled;
    } else {
        log::warn!("{kind} finished without output");
        task.state = TaskState::Completed;
    }
}

/// Tracks one [`BackgroundTask`] per [`ProbeKind`].
pub struct TaskRunner {
    tasks: HashMap<ProbeKind, BackgroundTask>,
    /// Published in place of a result when a worker panics.
    failure_line: String,
}

impl TaskRunner {
    pub fn new(failure_line: impl Into<String>) -> Self {
        Self {
            tasks: HashMap::new(),
            failure_line: failure_line.into(),
        }
    }

    /// Spawn a worker for `kind`.
    ///
    /// `op` returns `None` when it stopped early because its token was
    /// cancelled. Fails without spawning if `kind` is already running.
    pub fn start<F>(&mut self, kind: ProbeKind, op: F) -> Result<()>
    where
        F: FnOnce(&CancelToken) -> Option<Vec<String>> + Send + 'static,
    {
        if self.is_running(kind) {
            return Err(NetTesterError::Task(format!("{kind} already running")));
        }

        let cancel = CancelToken::new();
        let result = Arc::new(OnceLock::new());
        let worker_cancel = cancel.clone();
        let worker_result = Arc::clone(&result);
        let handle = thread::Builder::new()
            .name(kind.thread_name().to_string())
            .spawn(move || {
                if let Some(lines) = op(&worker_cancel) {
                    let _ = worker_result.set(lines);
                }
            })
            .map_err(|e| NetTesterError::Task(format!("spawning {kind} worker: {e}")))?;

        log::info!("Started {kind}");
        self.tasks.insert(
            kind,
            BackgroundTask {
                state: TaskState::Running,
                result,
                started_at: Instant::now(),
                cancel,
                handle: Some(handle),
                delivered: false,
            },
        );
        Ok(())
    }

    /// The task's output, once the worker has published it.
    pub fn poll(&mut self, kind: ProbeKind) -> Option<Vec<String>> {
        let task = self.tasks.get_mut(&kind)?;
        settle(kind, task, &self.failure_line);
        let lines = task.result.get()?.clone();
        task.delivered = true;
        Some(lines)
    }

    /// Whether a result is waiting that `poll` has not handed out yet.
    pub fn has_pending_result(&mut self, kind: ProbeKind) -> bool {
        match self.tasks.get_mut(&kind) {
            Some(task) => {
                settle(kind, task, &self.failure_line);
                task.result.get().is_some() && !task.delivered
            },
            None => false,
        }
    }

    /// Raise the cancellation token of a running task.
    pub fn cancel(&mut self, kind: ProbeKind) {
        if let Some(task) = self.tasks.get_mut(&kind)
            && task.state == TaskState::Running
        {
            log::debug!("Cancelling {kind}");
            task.cancel.cancel();
        }
    }

    pub fn state(&mut self, kind: ProbeKind) -> TaskState {
        match self.tasks.get_mut(&kind) {
            Some(task) => {
                settle(kind, task, &self.failure_line);
                task.state
            },
            None => TaskState::Idle,
        }
    }

    pub fn is_running(&mut self, kind: ProbeKind) -> bool {
        self.state(kind) == TaskState::Running
    }

    /// Whether `kind` is still running although its token was raised.
    pub fn is_cancelling(&mut self, kind: ProbeKind) -> bool {
        self.is_running(kind) && self.tasks.get(&kind).is_some_and(|t| t.cancel.is_cancelled())
    }

    /// Cancel everything and wait up to `timeout` for the workers to exit.
    ///
    /// Workers still alive at the deadline are marked `TimedOut` and
    /// detached. Returns the final state of every task that was started.
    pub fn shutdown(&mut self, timeout: Duration) -> Vec<(ProbeKind, TaskState)> {
        for kind in ProbeKind::ALL {
            self.cancel(kind);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let all_done = self
                .tasks
                .values()
                .all(|t| t.handle.as_ref().is_none_or(JoinHandle::is_finished));
            if all_done || Instant::now() >= deadline {
                break;
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        let mut states = Vec::with_capacity(self.tasks.len());
        for kind in ProbeKind::ALL {
            let Some(task) = self.tasks.get_mut(&kind) else {
                continue;
            };
            settle(kind, task, &self.failure_line);
            if task.state == TaskState::Running {
                log::warn!("{kind} did not stop within {}s, detaching", timeout.as_secs());
                task.state = TaskState::TimedOut;
                task.handle = None;
            } else if let Some(handle) = task.handle.take() {
                let _ = handle.join();
            }
            states.push((kind, task.state));
        }
        states
    }
}
