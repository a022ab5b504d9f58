//! # Template Retrieval Service
//!
//! This module is responsible for fetching the current template of a campaign
//! along with its file metadata. It provides the backend logic for the
//! `GET /campaign/{camp_id}/template` endpoint.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives the `camp_id` from the URL path.
//!
//! 2.  **Lookup**: The store resolves the authoritative `.html` file (a
//!     pre-existing file of any name wins over `<camp_id>.html`) and reads it on a
//!     blocking thread, journaled as a `TEMPLATE`/`GET` job.
//!
//! 3.  **HTTP Response**: The `TemplateView` is returned as JSON. A template that
//!     does not exist yet is not an error for the store, but the endpoint answers
//!     `404` with a short JSON body so clients can tell the cases apart.

use crate::error::EditError;
use crate::job_controller::audit::run_audited;
use crate::services::AppState;
use actix_web::{web, HttpResponse};
use common::jobs::{JobMode, JobType};
use serde_json::json;

/// Actix web handler for `GET /campaign/{camp_id}/template`.
///
/// # Returns
/// - `200 OK` with the `TemplateView` as JSON.
/// - `404 Not Found` with `{message, campaignId, exists: false}` when no template exists.
/// - `400 Bad Request` for an invalid campaign id.
pub(crate) async fn process(
    camp_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EditError> {
    let camp_id = camp_id.into_inner();
    log::info!("GET template request for campaign: {}", camp_id);

    let store = state.templates.clone();
    let id = camp_id.clone();
    let view = run_audited(
        state.audit.clone(),
        JobType::Template,
        JobMode::Get,
        json!(camp_id),
        move || store.get(&id),
    )
    .await?;

    if !view.exists {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": format!("Template not found for campaign: {}", camp_id),
            "campaignId": camp_id,
            "exists": false,
        })));
    }

    Ok(HttpResponse::Ok().json(view))
}
