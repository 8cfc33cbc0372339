//! Background edge-filter jobs with cooperative cancellation.
//!
//! A job moves `Pending → Running → {Succeeded, Failed, Cancelled}`. It is
//! created `Pending`, optionally waits for the job it replaces to reach a
//! terminal state, then runs the filter on its own worker thread while polling
//! a [`CancelToken`] between rows.
//!
//! A finished computation is only half the story: the job hands the result to
//! a commit closure, and the closure decides whether it is still wanted. If the
//! closure declines, the job ends `Cancelled` and the result is dropped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::convolution::{apply_edge_filter_until, EdgeAlgorithm, FilterError};
use crate::decode::PixelBuffer;

/// Monotonic job identifier, unique within a session.
pub type JobId = u64;

const LIVE: u8 = 0;
const CANCELLED: u8 = 1;
const COMMITTED: u8 = 2;

/// Shared flag a running job polls to see whether it should stop.
///
/// Cancelling and committing race for the same flag, so exactly one of them
/// wins: a result that has been committed can no longer be cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicU8>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns `false` if the token was already
    /// cancelled or its result already committed.
    pub fn cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst) == CANCELLED
    }

    pub fn is_committed(&self) -> bool {
        self.0.load(Ordering::SeqCst) == COMMITTED
    }

    /// Claim the token for committing a result. Fails once cancelled.
    pub fn commit(&self) -> bool {
        self.transition(COMMITTED)
    }

    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(LIVE, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// What a job delivered once it reached a terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// The filtered image, already committed as the session's current image.
    Succeeded(Arc<PixelBuffer>),
    /// The filter could not complete; nothing was committed.
    Failed(FilterError),
    /// Stopped or superseded; nothing was committed.
    Cancelled,
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            Self::Succeeded(_) => JobState::Succeeded,
            Self::Failed(_) => JobState::Failed,
            Self::Cancelled => JobState::Cancelled,
        }
    }

    /// Collapse into a `Result`, reporting cancellation as
    /// `FilterError::Cancelled`.
    pub fn into_result(self) -> Result<Arc<PixelBuffer>, FilterError> {
        match self {
            Self::Succeeded(buffer) => Ok(buffer),
            Self::Failed(err) => Err(err),
            Self::Cancelled => Err(FilterError::Cancelled),
        }
    }
}

#[derive(Debug)]
struct Status {
    state: JobState,
    outcome: Option<JobOutcome>,
}

#[derive(Debug)]
struct Shared {
    status: Mutex<Status>,
    changed: Condvar,
}

/// Cloneable view of a job for the caller that requested it.
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: JobId,
    algorithm: EdgeAlgorithm,
    strength: i32,
    cancel: CancelToken,
    shared: Arc<Shared>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn algorithm(&self) -> EdgeAlgorithm {
        self.algorithm
    }

    pub fn strength(&self) -> i32 {
        self.strength
    }

    pub fn state(&self) -> JobState {
        self.shared.status.lock().state
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Ask the job to stop at its next checkpoint.
    ///
    /// Returns whether the request took effect. It doesn't once the job is
    /// terminal or its result has been committed, or if cancellation was
    /// already requested.
    pub fn cancel(&self) -> bool {
        !self.is_finished() && self.cancel.cancel()
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The outcome if the job is already terminal.
    pub fn try_outcome(&self) -> Option<JobOutcome> {
        self.shared.status.lock().outcome.clone()
    }

    /// Block until the job is terminal.
    pub fn wait(&self) -> JobOutcome {
        let mut status = self.shared.status.lock();
        loop {
            if let Some(outcome) = &status.outcome {
                return outcome.clone();
            }
            self.shared.changed.wait(&mut status);
        }
    }

    /// Block until the job is terminal or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<JobOutcome> {
        let deadline = Instant::now() + timeout;
        let mut status = self.shared.status.lock();
        loop {
            if let Some(outcome) = &status.outcome {
                return Some(outcome.clone());
            }
            if self
                .shared
                .changed
                .wait_until(&mut status, deadline)
                .timed_out()
            {
                return status.outcome.clone();
            }
        }
    }

    fn set_running(&self) {
        let mut status = self.shared.status.lock();
        if status.state == JobState::Pending {
            status.state = JobState::Running;
            self.shared.changed.notify_all();
        }
    }

    fn finish(&self, outcome: JobOutcome) -> JobOutcome {
        let mut status = self.shared.status.lock();
        if let Some(existing) = &status.outcome {
            return existing.clone();
        }
        status.state = outcome.state();
        status.outcome = Some(outcome.clone());
        self.shared.changed.notify_all();
        outcome
    }
}

/// One edge-filter run over an immutable input snapshot.
pub struct EdgeFilterJob {
    handle: JobHandle,
    input: Arc<PixelBuffer>,
    predecessor: Option<JobHandle>,
}

impl EdgeFilterJob {
    /// Create a `Pending` job.
    pub fn new(
        id: JobId,
        input: Arc<PixelBuffer>,
        algorithm: EdgeAlgorithm,
        strength: i32,
    ) -> Self {
        let shared = Arc::new(Shared {
            status: Mutex::new(Status {
                state: JobState::Pending,
                outcome: None,
            }),
            changed: Condvar::new(),
        });
        Self {
            handle: JobHandle {
                id,
                algorithm,
                strength,
                cancel: CancelToken::new(),
                shared,
            },
            input,
            predecessor: None,
        }
    }

    /// Don't start running until `predecessor` is terminal.
    pub fn after(mut self, predecessor: JobHandle) -> Self {
        self.predecessor = Some(predecessor);
        self
    }

    pub fn handle(&self) -> JobHandle {
        self.handle.clone()
    }

    /// Run to completion on the calling thread.
    ///
    /// `commit` receives the finished image and returns whether it was
    /// accepted. A declined result ends the job `Cancelled`.
    pub fn run<C>(self, commit: C) -> JobOutcome
    where
        C: FnOnce(Arc<PixelBuffer>) -> bool,
    {
        let handle = self.handle;

        if let Some(previous) = self.predecessor {
            log::debug!(
                "job {} waiting for job {} to finish",
                handle.id,
                previous.id
            );
            previous.wait();
        }

        if let Some(outcome) = handle.try_outcome() {
            return outcome;
        }
        if handle.cancel_requested() {
            log::debug!("job {} cancelled before start", handle.id);
            return handle.finish(JobOutcome::Cancelled);
        }

        handle.set_running();
        log::debug!(
            "job {} running {} (strength {}) on {}x{}",
            handle.id,
            handle.algorithm,
            handle.strength,
            self.input.width,
            self.input.height
        );

        let token = handle.cancel.clone();
        let input = &self.input;
        let computed = panic::catch_unwind(AssertUnwindSafe(|| {
            apply_edge_filter_until(input, handle.algorithm, handle.strength, || {
                token.is_cancelled()
            })
        }));

        let outcome = match computed {
            Ok(Ok(output)) => {
                let output = Arc::new(output);
                if commit(Arc::clone(&output)) {
                    JobOutcome::Succeeded(output)
                } else {
                    log::debug!("job {} superseded, discarding result", handle.id);
                    JobOutcome::Cancelled
                }
            }
            Ok(Err(FilterError::Cancelled)) => JobOutcome::Cancelled,
            Ok(Err(err)) => {
                log::warn!("job {} failed: {}", handle.id, err);
                JobOutcome::Failed(err)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("job {} panicked: {}", handle.id, message);
                JobOutcome::Failed(FilterError::WorkerPanicked(message))
            }
        };

        log::debug!("job {} finished: {:?}", handle.id, outcome.state());
        handle.finish(outcome)
    }

    /// Run on a dedicated named worker thread and return its handle.
    ///
    /// If the thread can't be started the job is finished as `Failed` and the
    /// error is returned.
    pub fn spawn<C>(self, commit: C) -> Result<JobHandle, FilterError>
    where
        C: FnOnce(Arc<PixelBuffer>) -> bool + Send + 'static,
    {
        let handle = self.handle();
        let spawned = thread::Builder::new()
            .name(format!("edge-filter-{}", handle.id))
            .spawn(move || {
                self.run(commit);
            });

        match spawned {
            Ok(_) => Ok(handle),
            Err(err) => {
                let err = FilterError::SpawnFailed(err.to_string());
                handle.finish(JobOutcome::Failed(err.clone()));
                Err(err)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
