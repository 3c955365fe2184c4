//! One-shot backup and restore jobs.
//!
//! An executor inspects the storage mount state on the caller's thread,
//! then runs the remaining steps sequentially on a blocking worker. The
//! caller gets a [`JobHandle`] back and awaits exactly one [`JobReport`].

use std::fmt;
use std::path::PathBuf;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::JobError;

pub mod backup;
pub mod restore;

/// Opaque caller-chosen identifier, echoed back in the report.
pub type TaskId = u32;

/// Parameters of one backup or restore invocation.
///
/// For a backup `source_path` is copied into the backup file; for a restore
/// the backup file is copied over `source_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub task_id: TaskId,
    pub source_path: PathBuf,
    /// Folder relative to the storage root.
    pub backup_folder: PathBuf,
    pub backup_filename: String,
    pub overwrite: bool,
}

pub type BackupJob = JobSpec;
pub type RestoreJob = JobSpec;

impl JobSpec {
    pub fn new(
        task_id: TaskId,
        source_path: impl Into<PathBuf>,
        backup_folder: impl Into<PathBuf>,
        backup_filename: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            source_path: source_path.into(),
            backup_folder: backup_folder.into(),
            backup_filename: backup_filename.into(),
            overwrite: false,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Steps a job walks through, in order. No step is entered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStep {
    CheckingStorage,
    CheckingFile,
    CheckingVersion,
    Copying,
}

impl fmt::Display for JobStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStep::CheckingStorage => "checking storage",
            JobStep::CheckingFile => "checking file",
            JobStep::CheckingVersion => "checking version",
            JobStep::Copying => "copying",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobReport<O> {
    pub task_id: TaskId,
    pub outcome: O,
}

/// Cancellation point shared between a handle and its worker.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    task_id: TaskId,
    token: CancellationToken,
}

impl Checkpoint {
    fn new(task_id: TaskId) -> Self {
        Self { task_id, token: CancellationToken::new() }
    }

    /// Enter `step`, or bail out if the job was cancelled.
    pub fn enter(&self, step: JobStep) -> Result<(), JobError> {
        if self.token.is_cancelled() {
            debug!(task_id = self.task_id, %step, "job cancelled before step");
            return Err(JobError::Cancelled { task_id: self.task_id });
        }
        debug!(task_id = self.task_id, %step, "entering step");
        Ok(())
    }
}

enum JobState<O> {
    Ready(O),
    Running(JoinHandle<Result<O, JobError>>),
}

/// Handle to a single in-flight or already decided job.
pub struct JobHandle<O> {
    checkpoint: Checkpoint,
    state: JobState<O>,
}

impl<O: Send + 'static> JobHandle<O> {
    /// A job whose outcome was decided before any background work.
    pub(crate) fn ready(task_id: TaskId, outcome: O) -> Self {
        Self { checkpoint: Checkpoint::new(task_id), state: JobState::Ready(outcome) }
    }

    pub(crate) fn spawn<F>(runtime: &Handle, task_id: TaskId, work: F) -> Self
    where
        F: FnOnce(&Checkpoint) -> Result<O, JobError> + Send + 'static,
    {
        let checkpoint = Checkpoint::new(task_id);
        let worker = checkpoint.clone();
        let join = runtime.spawn_blocking(move || work(&worker));
        Self { checkpoint, state: JobState::Running(join) }
    }

    pub fn task_id(&self) -> TaskId {
        self.checkpoint.task_id
    }

    /// Ask the job to stop before its next step. A copy already under way
    /// still runs to completion.
    pub fn cancel(&self) {
        self.checkpoint.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            JobState::Ready(_) => true,
            JobState::Running(join) => join.is_finished(),
        }
    }

    pub async fn wait(self) -> Result<JobReport<O>, JobError> {
        let task_id = self.task_id();
        let outcome = match self.state {
            JobState::Ready(outcome) => outcome,
            JobState::Running(join) => join.await??,
        };
        Ok(JobReport { task_id, outcome })
    }
}

impl<O> fmt::Debug for JobHandle<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            JobState::Ready(_) => "ready",
            JobState::Running(_) => "running",
        };
        f.debug_struct("JobHandle")
            .field("task_id", &self.checkpoint.task_id)
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn ready_handle_reports_immediately_even_if_cancelled() {
        let handle = JobHandle::ready(7, "done");
        assert!(handle.is_finished());
        handle.cancel();
        let report = handle.wait().await.unwrap();
        assert_eq!(report, JobReport { task_id: 7, outcome: "done" });
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn spawned_work_echoes_task_id() {
        let handle = JobHandle::spawn(&Handle::current(), 42, |cp| {
            cp.enter(JobStep::CheckingFile)?;
            Ok(5_u8)
        });
        assert_eq!(handle.task_id(), 42);
        let report = handle.wait().await.unwrap();
        assert_eq!(report.task_id, 42);
        assert_eq!(report.outcome, 5);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_checkpoint_stops_the_worker() {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let handle = JobHandle::spawn(&Handle::current(), 3, move |cp| {
            cp.enter(JobStep::CheckingFile)?;
            rx.recv().ok();
            cp.enter(JobStep::Copying)?;
            Ok(())
        });
        handle.cancel();
        tx.send(()).unwrap();
        match handle.wait().await {
            Err(JobError::Cancelled { task_id }) => assert_eq!(task_id, 3),
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn panicking_worker_surfaces_as_join_error() {
        let handle: JobHandle<()> =
            JobHandle::spawn(&Handle::current(), 1, |_| panic!("worker blew up"));
        assert!(matches!(handle.wait().await, Err(JobError::Join(_))));
    }
}
