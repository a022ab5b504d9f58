//! HTTP surface of the campaign editor.
//!
//! Everything lives under `/campaign/{camp_id}`:
//! - `config`: read and overlay-update the campaign's `.conf` file.
//! - `templates`: read, replace, validate, download and upload the HTML template.

pub mod config;
pub mod templates;

use crate::config::Settings;
use crate::job_controller::audit::AuditRecorder;
use crate::job_controller::state::CampaignLocks;
use self::config::store::ConfigStore;
use self::templates::store::TemplateStore;
use std::sync::Arc;

/// Shared handler state, registered once as `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub configs: ConfigStore,
    pub templates: TemplateStore,
    pub audit: Arc<dyn AuditRecorder>,
    pub locks: CampaignLocks,
}

impl AppState {
    pub fn new(settings: &Settings, audit: Arc<dyn AuditRecorder>) -> Self {
        Self {
            configs: ConfigStore::new(&settings.config_base),
            templates: TemplateStore::new(&settings.template_base),
            audit,
            locks: CampaignLocks::new(),
        }
    }
}
