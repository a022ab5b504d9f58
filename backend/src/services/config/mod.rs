//! # Campaign Config Service Module
//!
//! Endpoints for the sectioned `<campaignId>.conf` file of a campaign.
//!
//! ## Sub-modules:
//! - `codec`: parses and renders the sectioned text format.
//! - `store`: locates, reads and rewrites config files on disk.
//! - `get`: handler returning the parsed config.
//! - `update`: handler applying a partial update.

pub mod codec;
mod get;
pub mod store;
mod update;

use actix_web::web::{get, put, scope};
use actix_web::Scope;

/// The base path for the config endpoints of one campaign.
const API_PATH: &str = "/campaign/{camp_id}/config";

/// Configures and returns the Actix `Scope` for config routes.
///
/// # Registered Routes:
///
/// *   **`GET /campaign/{camp_id}/config`**:
///     - **Handler**: `get::process`
///     - **Description**: Parses the campaign's config file and returns it as a
///       `CampaignConfig` JSON object. `404` when the file does not exist.
///
/// *   **`PUT /campaign/{camp_id}/config`**:
///     - **Handler**: `update::process`
///     - **Description**: Overlays the fields present in a `ConfigUpdateRequest`
///       onto the stored config, rewrites the file and returns the merged record.
///       Never creates a missing config file (`404`).
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::process))
        .route("", put().to(update::process))
}
