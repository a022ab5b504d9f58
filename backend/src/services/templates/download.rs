use crate::error::EditError;
use crate::job_controller::audit::run_audited;
use crate::services::AppState;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use common::jobs::{JobMode, JobType};
use mime_guess::from_path;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

/// What the journal records for a download; the bytes stay out of it.
#[derive(Serialize)]
struct Downloaded {
    path: PathBuf,
    size: usize,
    #[serde(skip)]
    bytes: Vec<u8>,
}

/// Actix web handler for `GET /campaign/{camp_id}/template/download`.
///
/// Serves the authoritative template file as an attachment named
/// `<camp_id>.html`, whatever its name on disk.
pub(crate) async fn process(
    camp_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EditError> {
    let camp_id = camp_id.into_inner();
    log::info!("Download template file request for campaign: {}", camp_id);

    let store = state.templates.clone();
    let id = camp_id.clone();
    let file = run_audited(
        state.audit.clone(),
        JobType::Template,
        JobMode::Download,
        json!(camp_id),
        move || {
            let (path, bytes) = store.read_bytes(&id)?;
            Ok(Downloaded {
                path,
                size: bytes.len(),
                bytes,
            })
        },
    )
    .await?;

    let mime = from_path(&file.path).first_or_octet_stream();
    Ok(HttpResponse::Ok()
        .content_type(mime.as_ref())
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.html\"", camp_id),
        ))
        .body(file.bytes))
}
