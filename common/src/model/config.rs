use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Namespace constant written to `[namespace]` when a file does not declare one.
pub const DEFAULT_NAMESPACE_CONSTANT: &str = "campid";

/// Structured view of a campaign's sectioned `.conf` file.
///
/// The record is rebuilt from disk on every read; the backend never caches it.
/// `message_headers` keeps insertion order because that order is the order the
/// headers are written back in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignConfig {
    /// Campaign identifier, also the file name stem on disk.
    pub campaign_id: String,
    /// `[constants] campid`, falls back to `campaign_id`.
    pub constant_campaign_id: String,
    /// `[metadata] column` entries in file order. Duplicates are kept.
    pub metadata_columns: Vec<String>,
    /// `[template] path`.
    pub template_path: Option<String>,
    /// `[msghdrs]` entries.
    pub message_headers: IndexMap<String, String>,
    /// `[attachments] dir`.
    pub attachment_dir: Option<String>,
    /// `[namespace] constant`, falls back to [`DEFAULT_NAMESPACE_CONSTANT`].
    pub namespace_constant: String,
}

impl CampaignConfig {
    /// An empty record with every defaulted field resolved for `campaign_id`.
    pub fn new(campaign_id: impl Into<String>) -> Self {
        let campaign_id = campaign_id.into();
        Self {
            constant_campaign_id: campaign_id.clone(),
            campaign_id,
            metadata_columns: Vec::new(),
            template_path: None,
            message_headers: IndexMap::new(),
            attachment_dir: None,
            namespace_constant: DEFAULT_NAMESPACE_CONSTANT.to_string(),
        }
    }

    /// Overlays every field that is present in `update`, leaving the rest untouched.
    ///
    /// List and map fields are replaced wholesale, never merged element by element.
    pub fn apply(&mut self, update: ConfigUpdateRequest) {
        if let Some(constant) = update.constant_campaign_id {
            self.constant_campaign_id = constant;
        }
        if let Some(columns) = update.metadata_columns {
            self.metadata_columns = columns;
        }
        if let Some(path) = update.template_path {
            self.template_path = Some(path);
        }
        if let Some(headers) = update.message_headers {
            self.message_headers = headers;
        }
        if let Some(dir) = update.attachment_dir {
            self.attachment_dir = Some(dir);
        }
        if let Some(namespace) = update.namespace_constant {
            self.namespace_constant = namespace;
        }
    }
}

/// Partial update for a [`CampaignConfig`]. `None` means "keep the stored value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdateRequest {
    #[serde(default, alias = "constantCampId", skip_serializing_if = "Option::is_none")]
    pub constant_campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_path: Option<String>,
    #[serde(default, alias = "msgHeaders", skip_serializing_if = "Option::is_none")]
    pub message_headers: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_constant: Option<String>,
}
