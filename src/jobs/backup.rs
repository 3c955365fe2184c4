use std::fs;
use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::{BackupJob, Checkpoint, JobHandle, JobStep};
use crate::drivers::DbTransfer;
use crate::error::JobError;
use crate::storage::{StorageProbe, StorageState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    Completed,
    /// Backup file exists and the job did not allow overwriting it.
    RequiresOverwrite,
    /// Storage is read-only, or the old backup file could not be removed.
    ReadOnly,
    /// Storage is missing or unmounted.
    StorageProblem,
    /// The copy itself failed; the backup file may be incomplete.
    CopyFailed,
}

pub struct BackupExecutor {
    runtime: Handle,
    storage: Arc<dyn StorageProbe>,
    transfer: Arc<dyn DbTransfer>,
}

impl BackupExecutor {
    pub fn new(runtime: Handle, storage: Arc<dyn StorageProbe>, transfer: Arc<dyn DbTransfer>) -> Self {
        Self { runtime, storage, transfer }
    }

    pub fn perform(&self, job: BackupJob) -> JobHandle<BackupOutcome> {
        let state = self.storage.state();
        debug!(task_id = job.task_id, step = %JobStep::CheckingStorage, ?state, "entering step");
        match state {
            StorageState::Mounted => {}
            StorageState::MountedReadOnly => {
                return JobHandle::ready(job.task_id, BackupOutcome::ReadOnly);
            }
            StorageState::Unmounted => {
                return JobHandle::ready(job.task_id, BackupOutcome::StorageProblem);
            }
        }

        info!(task_id = job.task_id, overwrite = job.overwrite, "starting backup");
        let destination = self.storage.resolve(&job.backup_folder, &job.backup_filename);
        let transfer = Arc::clone(&self.transfer);
        JobHandle::spawn(&self.runtime, job.task_id, move |checkpoint| {
            let outcome = run_backup(&job, &destination, transfer.as_ref(), checkpoint)?;
            info!(task_id = job.task_id, ?outcome, "backup finished");
            Ok(outcome)
        })
    }
}

fn run_backup(
    job: &BackupJob,
    destination: &Path,
    transfer: &dyn DbTransfer,
    checkpoint: &Checkpoint,
) -> Result<BackupOutcome, JobError> {
    checkpoint.enter(JobStep::CheckingFile)?;
    if destination.exists() {
        if !job.overwrite {
            return Ok(BackupOutcome::RequiresOverwrite);
        }
        checkpoint.enter(JobStep::Copying)?;
        if let Err(err) = fs::remove_file(destination) {
            warn!(path = %destination.display(), error = %err, "could not remove old backup");
            return Ok(BackupOutcome::ReadOnly);
        }
    } else {
        checkpoint.enter(JobStep::Copying)?;
    }

    match transfer.copy(&job.source_path, destination) {
        Ok(_) => Ok(BackupOutcome::Completed),
        Err(err) => {
            warn!(driver = transfer.name(), error = %err, "backup copy failed");
            Ok(BackupOutcome::CopyFailed)
        }
    }
}
