use serde::Serialize;
use std::fmt;

/// Which artifact an audited job touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Config,
    Template,
}

/// What an audited job did to the artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobMode {
    Get,
    Update,
    Download,
    Upload,
}

/// Lifecycle of a row in the job audit journal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Started,
    Success,
    Failed,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::Config => "CONFIG",
            JobType::Template => "TEMPLATE",
        }
    }
}

impl JobMode {
    pub fn as_str(self) -> &'static str {
        match self {
            JobMode::Get => "GET",
            JobMode::Update => "UPDATE",
            JobMode::Download => "DOWNLOAD",
            JobMode::Upload => "UPLOAD",
        }
    }
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Started => "STARTED",
            JobStatus::Success => "SUCCESS",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for JobMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
