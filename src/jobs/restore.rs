use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::{Checkpoint, JobHandle, JobStep, RestoreJob};
use crate::drivers::DbTransfer;
use crate::error::JobError;
use crate::storage::StorageProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Completed,
    /// Versions match but the job did not allow replacing the live database.
    RequiresOverwrite,
    /// Backup and live database carry different versions, or either could not be probed.
    VersionMismatch,
    FileNotFound,
    /// Storage is missing or unmounted.
    Problem,
    /// The copy itself failed; the live database may be damaged.
    CopyFailed,
}

/// Replaces the live database with a previously taken backup.
///
/// No lock is taken on the live database while it is overwritten; callers
/// must keep their own connections quiet for the duration.
pub struct RestoreExecutor {
    runtime: Handle,
    storage: Arc<dyn StorageProbe>,
    transfer: Arc<dyn DbTransfer>,
}

impl RestoreExecutor {
    pub fn new(runtime: Handle, storage: Arc<dyn StorageProbe>, transfer: Arc<dyn DbTransfer>) -> Self {
        Self { runtime, storage, transfer }
    }

    pub fn perform(&self, job: RestoreJob) -> JobHandle<RestoreOutcome> {
        let state = self.storage.state();
        debug!(task_id = job.task_id, step = %JobStep::CheckingStorage, ?state, "entering step");
        if !state.is_readable() {
            return JobHandle::ready(job.task_id, RestoreOutcome::Problem);
        }

        info!(task_id = job.task_id, overwrite = job.overwrite, "starting restore");
        let backup = self.storage.resolve(&job.backup_folder, &job.backup_filename);
        let transfer = Arc::clone(&self.transfer);
        JobHandle::spawn(&self.runtime, job.task_id, move |checkpoint| {
            let outcome = run_restore(&job, &backup, transfer.as_ref(), checkpoint)?;
            info!(task_id = job.task_id, ?outcome, "restore finished");
            Ok(outcome)
        })
    }
}

fn run_restore(
    job: &RestoreJob,
    backup: &Path,
    transfer: &dyn DbTransfer,
    checkpoint: &Checkpoint,
) -> Result<RestoreOutcome, JobError> {
    checkpoint.enter(JobStep::CheckingFile)?;
    if !backup.exists() {
        return Ok(RestoreOutcome::FileNotFound);
    }

    checkpoint.enter(JobStep::CheckingVersion)?;
    match transfer.versions_match(backup, &job.source_path) {
        Ok(true) => {}
        Ok(false) => return Ok(RestoreOutcome::VersionMismatch),
        Err(err) => {
            warn!(error = %err, "version probe failed");
            return Ok(RestoreOutcome::VersionMismatch);
        }
    }

    if !job.overwrite {
        return Ok(RestoreOutcome::RequiresOverwrite);
    }

    checkpoint.enter(JobStep::Copying)?;
    match transfer.copy(backup, &job.source_path) {
        Ok(_) => Ok(RestoreOutcome::Completed),
        Err(err) => {
            warn!(driver = transfer.name(), error = %err, "restore copy failed");
            Ok(RestoreOutcome::CopyFailed)
        }
    }
}
