//! # Config Update Service
//!
//! Backs `PUT /campaign/{camp_id}/config`. Only the fields present in the
//! request body replace stored values. Writes for one campaign are serialized
//! through [`CampaignLocks`](crate::job_controller::state::CampaignLocks).

use crate::campaign::ensure_path_safe;
use crate::error::EditError;
use crate::job_controller::audit::run_audited;
use crate::job_controller::state::Artifact;
use crate::services::AppState;
use actix_web::{web, HttpResponse};
use common::jobs::{JobMode, JobType};
use common::model::config::ConfigUpdateRequest;
use serde_json::json;

/// Actix web handler for `PUT /campaign/{camp_id}/config`.
///
/// # Returns
/// - `200 OK` with the merged `CampaignConfig`.
/// - `404 Not Found` when there is no config file to update.
pub(crate) async fn process(
    camp_id: web::Path<String>,
    payload: web::Json<ConfigUpdateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EditError> {
    let camp_id = camp_id.into_inner();
    let update = payload.into_inner();
    let request = json!({ "campaignId": camp_id, "update": update });

    ensure_path_safe(&camp_id)?;
    let _guard = state.locks.acquire(Artifact::Config, &camp_id).await;
    let store = state.configs.clone();
    let merged = run_audited(
        state.audit.clone(),
        JobType::Config,
        JobMode::Update,
        request,
        move || store.update(&camp_id, update),
    )
    .await?;

    Ok(HttpResponse::Ok().json(merged))
}
