//! # Template Service Module
//!
//! This module aggregates all API endpoints related to the management of a
//! campaign's HTML template. It acts as a router, directing incoming HTTP
//! requests under `/campaign/{camp_id}/template` to the appropriate handler.
//!
//! ## Sub-modules:
//! - `store`: resolves, validates, hashes, backs up and writes template files.
//! - `get`: returns the current template and its metadata.
//! - `update`: replaces the template from a JSON body, optionally backing it up first.
//! - `validate`: checks content without saving it.
//! - `download`: serves the raw template file as an attachment.
//! - `upload`: replaces the template from a multipart `.html` upload.

mod download;
mod get;
pub mod store;
mod update;
mod upload;
mod validate;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

/// The base path for all template endpoints of one campaign.
const API_PATH: &str = "/campaign/{camp_id}/template";

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// *   **`GET /campaign/{camp_id}/template`**:
///     - **Handler**: `get::process`
///     - **Description**: Returns a `TemplateView` with the content, size, last
///       modification time, SHA-256 hash, structural validity and backup state.
///       Responds `404` with `exists: false` when there is no template yet.
///
/// *   **`PUT /campaign/{camp_id}/template`**:
///     - **Handler**: `update::process`
///     - **Description**: Writes `htmlContent` from a `TemplateUpdateRequest`.
///       When `createBackup` is set and a template already exists, the old file
///       is first copied into `backups/`.
///
/// *   **`POST /campaign/{camp_id}/template/validate`**:
///     - **Handler**: `validate::process`
///     - **Description**: Runs the content checks without writing anything.
///
/// *   **`GET /campaign/{camp_id}/template/download`**:
///     - **Handler**: `download::process`
///     - **Description**: Streams the template file back as `<camp_id>.html`.
///
/// *   **`POST /campaign/{camp_id}/template/upload`**:
///     - **Handler**: `upload::process`
///     - **Description**: Accepts a multipart `file` field holding an `.html`
///       file. `?createBackup=false` skips the backup, which is on by default.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::process))
        .route("", put().to(update::process))
        .route("/validate", post().to(validate::process))
        .route("/download", get().to(download::process))
        .route("/upload", post().to(upload::process))
}
