//! SQLite-backed job journal.
//!
//! One row per audited request in the `jobq` table. A row is inserted as
//! `STARTED` when the job begins and completed with the response payload and
//! final status when it ends. Every database error is logged and dropped.

use crate::job_controller::audit::{AuditRecorder, JobId};
use chrono::Utc;
use common::jobs::{JobMode, JobStatus, JobType};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS jobq (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    jobtype   TEXT NOT NULL,
    mode      TEXT NOT NULL,
    starttime TEXT NOT NULL,
    endtime   TEXT,
    request   TEXT,
    response  TEXT,
    status    TEXT NOT NULL,
    uuid      TEXT NOT NULL
)";

pub struct SqliteAuditRecorder {
    conn: Mutex<Connection>,
}

impl SqliteAuditRecorder {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn insert_start(
        &self,
        job_type: JobType,
        mode: JobMode,
        request: &Value,
    ) -> Result<i64, String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO jobq (jobtype, mode, starttime, request, status, uuid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                job_type.as_str(),
                mode.as_str(),
                Utc::now().to_rfc3339(),
                request.to_string(),
                JobStatus::Started.as_str(),
                Uuid::new_v4().to_string(),
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    fn update_end(&self, job_id: JobId, response: &Value, status: JobStatus) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE jobq SET endtime = ?1, response = ?2, status = ?3 WHERE id = ?4",
            params![
                Utc::now().to_rfc3339(),
                response.to_string(),
                status.as_str(),
                job_id.0
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl AuditRecorder for SqliteAuditRecorder {
    fn begin_job(&self, job_type: JobType, mode: JobMode, request: &Value) -> JobId {
        match self.insert_start(job_type, mode, request) {
            Ok(id) => JobId(id),
            Err(e) => {
                log::warn!("Failed to record start of {} {} job: {}", job_type, mode, e);
                JobId::NONE
            }
        }
    }

    fn end_job(&self, job_id: JobId, response: &Value, status: JobStatus) {
        if job_id.is_none() {
            return;
        }
        if let Err(e) = self.update_end(job_id, response, status) {
            log::warn!("Failed to record end of job {}: {}", job_id.0, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(recorder: &SqliteAuditRecorder, id: i64) -> (String, String, String, Option<String>, Option<String>) {
        let conn = recorder.conn.lock().unwrap();
        conn.query_row(
            "SELECT jobtype, mode, status, request, response FROM jobq WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )
        .unwrap()
    }

    fn count(recorder: &SqliteAuditRecorder) -> i64 {
        let conn = recorder.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM jobq", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn begin_then_end_completes_the_row() {
        let recorder = SqliteAuditRecorder::open_in_memory().unwrap();
        let id = recorder.begin_job(JobType::Template, JobMode::Update, &json!({"htmlContent": "<html/>"}));
        assert!(!id.is_none());

        let (jobtype, mode, status, request, response) = row(&recorder, id.0);
        assert_eq!((jobtype.as_str(), mode.as_str(), status.as_str()), ("TEMPLATE", "UPDATE", "STARTED"));
        assert_eq!(request.as_deref(), Some(r#"{"htmlContent":"<html/>"}"#));
        assert!(response.is_none());

        recorder.end_job(id, &json!("boom"), JobStatus::Failed);
        let (_, _, status, _, response) = row(&recorder, id.0);
        assert_eq!(status, "FAILED");
        assert_eq!(response.as_deref(), Some("\"boom\""));
    }

    #[test]
    fn ids_are_distinct() {
        let recorder = SqliteAuditRecorder::open_in_memory().unwrap();
        let a = recorder.begin_job(JobType::Config, JobMode::Get, &json!("A"));
        let b = recorder.begin_job(JobType::Config, JobMode::Get, &json!("B"));
        assert_ne!(a, b);
        assert_eq!(count(&recorder), 2);
    }

    #[test]
    fn sentinel_end_is_a_no_op() {
        let recorder = SqliteAuditRecorder::open_in_memory().unwrap();
        let id = recorder.begin_job(JobType::Config, JobMode::Get, &json!("A"));
        recorder.end_job(JobId::NONE, &json!("ignored"), JobStatus::Success);
        let (_, _, status, _, _) = row(&recorder, id.0);
        assert_eq!(status, "STARTED");
    }

    #[test]
    fn broken_journal_returns_sentinel_instead_of_failing() {
        let recorder = SqliteAuditRecorder::open_in_memory().unwrap();
        recorder
            .conn
            .lock()
            .unwrap()
            .execute("DROP TABLE jobq", [])
            .unwrap();

        let id = recorder.begin_job(JobType::Config, JobMode::Update, &Value::Null);
        assert_eq!(id, JobId::NONE);
        recorder.end_job(JobId(42), &Value::Null, JobStatus::Success);
    }

    #[test]
    fn opens_file_backed_journal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobq.sqlite");
        {
            let recorder = SqliteAuditRecorder::open(&path).unwrap();
            recorder.begin_job(JobType::Config, JobMode::Get, &json!("C1"));
        }
        let reopened = SqliteAuditRecorder::open(&path).unwrap();
        assert_eq!(count(&reopened), 1);
    }
}
