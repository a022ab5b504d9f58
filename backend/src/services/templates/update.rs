use crate::campaign::validate_campaign_id;
use crate::error::EditError;
use crate::job_controller::audit::run_audited;
use crate::job_controller::state::Artifact;
use crate::services::AppState;
use actix_web::{web, HttpResponse};
use common::jobs::{JobMode, JobType};
use common::model::template::TemplateUpdateRequest;
use serde_json::json;

/// Actix web handler for `PUT /campaign/{camp_id}/template`.
///
/// Content is validated before anything is written; a failed structural check
/// is only reported through `validHtml` in the response.
pub(crate) async fn process(
    camp_id: web::Path<String>,
    payload: web::Json<TemplateUpdateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EditError> {
    let camp_id = camp_id.into_inner();
    let request = payload.into_inner();
    log::info!("PUT template request for campaign: {}", camp_id);

    // The journal keeps the request minus the content itself.
    let journal = json!({
        "campaignId": camp_id,
        "description": request.description,
        "version": request.version,
        "createBackup": request.create_backup,
        "contentLength": request.html_content.as_ref().map(String::len),
    });

    validate_campaign_id(&camp_id)?;
    let _guard = state.locks.acquire(Artifact::Template, &camp_id).await;
    let store = state.templates.clone();
    let id = camp_id.clone();
    let view = run_audited(
        state.audit.clone(),
        JobType::Template,
        JobMode::Update,
        journal,
        move || store.update(&id, request),
    )
    .await?;

    log::info!("Successfully updated template for campaign: {}", camp_id);
    Ok(HttpResponse::Ok().json(view))
}
