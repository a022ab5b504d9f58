use crate::campaign::validate_campaign_id;
use crate::error::EditError;
use crate::job_controller::audit::run_audited;
use crate::job_controller::state::Artifact;
use crate::services::templates::store::MAX_TEMPLATE_SIZE;
use crate::services::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::jobs::{JobMode, JobType};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub(crate) struct UploadParams {
    #[serde(rename = "createBackup", default = "default_create_backup")]
    create_backup: bool,
}

fn default_create_backup() -> bool {
    true
}

/// An uploaded template that passed the upload-specific checks.
struct UploadedFile {
    filename: String,
    content: String,
}

/// Reads the `file` field of the multipart body.
///
/// Other fields are drained and ignored. Reading stops as soon as the file
/// grows past [`MAX_TEMPLATE_SIZE`].
async fn read_file_field(mut payload: Multipart) -> Result<UploadedFile, EditError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| EditError::invalid(format!("Malformed upload: {}", e)))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if name.as_deref() != Some("file") {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| EditError::invalid(format!("Malformed upload: {}", e)))?;
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| EditError::invalid(format!("Malformed upload: {}", e)))?;
            bytes.extend_from_slice(&chunk);
            if bytes.len() > MAX_TEMPLATE_SIZE {
                return Err(EditError::invalid(format!(
                    "HTML content exceeds maximum size of {}MB",
                    MAX_TEMPLATE_SIZE / 1024 / 1024
                )));
            }
        }
        upload = Some((filename, bytes));
    }

    let (filename, bytes) = upload.ok_or_else(|| EditError::invalid("Missing file field"))?;
    if bytes.is_empty() {
        return Err(EditError::invalid("File is empty"));
    }
    if !filename.to_ascii_lowercase().ends_with(".html") {
        return Err(EditError::invalid(
            "File must be an HTML file (.html extension)",
        ));
    }
    let content = String::from_utf8(bytes)
        .map_err(|_| EditError::invalid("File is not valid UTF-8"))?;

    Ok(UploadedFile { filename, content })
}

/// Actix web handler for `POST /campaign/{camp_id}/template/upload`.
///
/// Upload checks (empty file, extension, encoding, size) are journaled as a
/// failed `TEMPLATE`/`UPLOAD` job like any store failure.
pub(crate) async fn process(
    camp_id: web::Path<String>,
    params: web::Query<UploadParams>,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EditError> {
    let camp_id = camp_id.into_inner();
    let create_backup = params.create_backup;

    let upload = read_file_field(payload).await;
    let filename = upload
        .as_ref()
        .map(|u| u.filename.clone())
        .unwrap_or_default();
    log::info!(
        "Upload template file request for campaign: {} (file: {})",
        camp_id,
        filename
    );

    validate_campaign_id(&camp_id)?;
    let _guard = state.locks.acquire(Artifact::Template, &camp_id).await;
    let store = state.templates.clone();
    let id = camp_id.clone();
    let view = run_audited(
        state.audit.clone(),
        JobType::Template,
        JobMode::Upload,
        json!(format!("{} - {}", camp_id, filename)),
        move || {
            let upload = upload?;
            store.update_from_file(&id, upload.content, create_backup)
        },
    )
    .await?;

    log::info!("Successfully uploaded template file for campaign: {}", camp_id);
    Ok(HttpResponse::Ok().json(view))
}
