use crate::campaign::validate_campaign_id;
use crate::error::EditError;
use crate::services::templates::store::is_valid_template;
use actix_web::{web, HttpResponse};
use common::model::template::{TemplateUpdateRequest, ValidationReport};

/// Actix web handler for `POST /campaign/{camp_id}/template/validate`.
///
/// Nothing is written and nothing is journaled. Content that fails a hard gate
/// yields `valid: false` rather than an error status.
pub(crate) async fn process(
    camp_id: web::Path<String>,
    payload: web::Json<TemplateUpdateRequest>,
) -> Result<HttpResponse, EditError> {
    let camp_id = camp_id.into_inner();
    log::info!("Validate template request for campaign: {}", camp_id);
    validate_campaign_id(&camp_id)?;

    let valid = is_valid_template(payload.html_content.as_deref());
    Ok(HttpResponse::Ok().json(ValidationReport {
        campaign_id: camp_id,
        valid,
        message: if valid {
            "Template is valid".to_string()
        } else {
            "Template validation failed".to_string()
        },
    }))
}
