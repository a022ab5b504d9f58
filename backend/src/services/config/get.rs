//! # Config Retrieval Service
//!
//! Backs `GET /campaign/{camp_id}/config`. The file is parsed fresh on every
//! request and the audit journal records the request as a `CONFIG`/`GET` job.

use crate::error::EditError;
use crate::job_controller::audit::run_audited;
use crate::services::AppState;
use actix_web::{web, HttpResponse};
use common::jobs::{JobMode, JobType};
use serde_json::json;

/// Actix web handler for `GET /campaign/{camp_id}/config`.
///
/// # Returns
/// - `200 OK` with the `CampaignConfig` as JSON.
/// - `400 Bad Request` for an unusable campaign id.
/// - `404 Not Found` when the config file does not exist.
pub(crate) async fn process(
    camp_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EditError> {
    let camp_id = camp_id.into_inner();
    let store = state.configs.clone();

    let config = run_audited(
        state.audit.clone(),
        JobType::Config,
        JobMode::Get,
        json!(camp_id),
        move || store.read(&camp_id),
    )
    .await?;

    Ok(HttpResponse::Ok().json(config))
}
