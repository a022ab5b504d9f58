mod campaign;
mod config;
mod error;
mod fs_util;
mod job_controller;
mod services;

use crate::config::Settings;
use crate::job_controller::audit::{AuditRecorder, NullAuditRecorder};
use crate::job_controller::sqlite::SqliteAuditRecorder;
use crate::services::AppState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::io;
use std::sync::Arc;

/// Opens the job journal. The editor keeps working without one.
fn open_audit(settings: &Settings) -> Arc<dyn AuditRecorder> {
    match SqliteAuditRecorder::open(&settings.audit_db) {
        Ok(recorder) => Arc::new(recorder),
        Err(e) => {
            warn!(
                "Audit journal {} unavailable, jobs will not be recorded: {}",
                settings.audit_db.display(),
                e
            );
            Arc::new(NullAuditRecorder)
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::load().map_err(io::Error::other)?;
    let state = AppState::new(&settings, open_audit(&settings));
    info!(
        "Config files under {}, templates under {}",
        state.configs.base().display(),
        state.templates.base().display()
    );
    let json_limit = settings.json_limit_bytes;
    let (host, port) = settings.bind_addr();

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(state.clone()))
            .service(services::config::configure_routes())
            .service(services::templates::configure_routes())
    })
        .bind((host.as_str(), port))?
        .run()
        .await
}
