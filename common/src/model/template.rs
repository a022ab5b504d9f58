use serde::{Deserialize, Serialize};

/// Snapshot of a campaign's HTML template as it sits on disk.
///
/// Returned by both the read and the update endpoints. When `exists` is false
/// every other field is empty or zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateView {
    pub campaign_id: String,
    pub html_content: String,
    /// Resolved file location. May name a pre-existing file other than `<id>.html`.
    pub file_path: String,
    pub exists: bool,
    pub file_size: u64,
    /// RFC 3339 UTC timestamp, empty when the file does not exist.
    pub last_modified: String,
    /// Hex-encoded SHA-256 of `html_content`.
    pub content_hash: String,
    pub valid_html: bool,
    pub validation_message: String,
    pub has_backup: bool,
    /// Backup directory on reads, the snapshot file just written on updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Body of `PUT /campaign/{campId}/template` and `POST .../template/validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdateRequest {
    /// `None` is rejected by validation; kept optional so a JSON `null` reaches it.
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub create_backup: bool,
}

/// Response of the validate endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub campaign_id: String,
    pub valid: bool,
    pub message: String,
}
