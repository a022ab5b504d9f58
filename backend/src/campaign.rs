//! Campaign id checks.
//!
//! Storage paths are built by joining the campaign id onto a base directory, so
//! these checks are the only thing standing between a request and an arbitrary
//! path on disk. They run before any filesystem access.

use crate::error::EditError;

/// Longest campaign id the template store accepts.
pub const MAX_CAMPAIGN_ID_LEN: usize = 50;

/// Rejects ids that are blank or could escape the base directory.
pub fn ensure_path_safe(campaign_id: &str) -> Result<(), EditError> {
    if campaign_id.trim().is_empty() {
        return Err(EditError::invalid("Campaign ID cannot be null or empty"));
    }
    if campaign_id.contains("..") || campaign_id.contains('/') || campaign_id.contains('\\') {
        return Err(EditError::invalid(
            "Invalid campaign ID: contains illegal characters",
        ));
    }
    Ok(())
}

/// Full template-store check: path safety plus the length cap.
pub fn validate_campaign_id(campaign_id: &str) -> Result<(), EditError> {
    ensure_path_safe(campaign_id)?;
    if campaign_id.chars().count() > MAX_CAMPAIGN_ID_LEN {
        return Err(EditError::invalid(format!(
            "Campaign ID too long (max {} characters)",
            MAX_CAMPAIGN_ID_LEN
        )));
    }
    Ok(())
}
