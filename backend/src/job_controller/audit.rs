//! Best-effort audit trail of edit jobs.
//!
//! Handlers bracket every audited operation with [`AuditRecorder::begin_job`]
//! and [`AuditRecorder::end_job`]. A recorder must swallow its own failures:
//! whatever happens to the journal, the edit itself succeeds or fails on its
//! own merits.

use crate::error::EditError;
use common::jobs::{JobMode, JobStatus, JobType};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Journal row id. `JobId::NONE` means the start was never recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobId(pub i64);

impl JobId {
    pub const NONE: JobId = JobId(0);

    pub fn is_none(self) -> bool {
        self == JobId::NONE
    }
}

pub trait AuditRecorder: Send + Sync {
    /// Records the start of a job and returns its id, or [`JobId::NONE`] on failure.
    fn begin_job(&self, job_type: JobType, mode: JobMode, request: &Value) -> JobId;

    /// Records the outcome of a job. A no-op for [`JobId::NONE`].
    fn end_job(&self, job_id: JobId, response: &Value, status: JobStatus);
}

/// Recorder that drops everything, for deployments without a journal.
pub struct NullAuditRecorder;

impl AuditRecorder for NullAuditRecorder {
    fn begin_job(&self, _job_type: JobType, _mode: JobMode, _request: &Value) -> JobId {
        JobId::NONE
    }

    fn end_job(&self, _job_id: JobId, _response: &Value, _status: JobStatus) {}
}

/// Runs `op` on the blocking pool, journaling its start and outcome.
///
/// On success the serialized result is journaled, on failure the error message.
pub async fn run_audited<T, F>(
    recorder: Arc<dyn AuditRecorder>,
    job_type: JobType,
    mode: JobMode,
    request: Value,
    op: F,
) -> Result<T, EditError>
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, EditError> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(move || {
        let job_id = recorder.begin_job(job_type, mode, &request);
        let result = op();
        match &result {
            Ok(value) => {
                let response = serde_json::to_value(value).unwrap_or(Value::Null);
                recorder.end_job(job_id, &response, JobStatus::Success);
            }
            Err(e) => {
                recorder.end_job(job_id, &Value::String(e.to_string()), JobStatus::Failed);
            }
        }
        result
    });

    match handle.await {
        Ok(result) => result,
        Err(join_err) => Err(EditError::Internal(format!(
            "{} {} task join error: {}",
            job_type, mode, join_err
        ))),
    }
}
