//! Error taxonomy shared by the stores and the HTTP handlers.
//!
//! Every store operation returns [`EditError`]. Handlers return it directly and
//! actix turns it into a JSON error body through [`ResponseError`].

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Bad campaign id or unacceptable content.
    #[error("{0}")]
    InvalidArgument(String),

    /// Config or template file missing on an operation that needs it.
    #[error("{0}")]
    NotFound(String),

    /// Filesystem failure not explained by the kinds above.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Anything else. The detail is logged, never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EditError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EditError::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        EditError::NotFound(message.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        EditError::Io {
            context: context.into(),
            source,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            EditError::InvalidArgument(_) => "Validation error",
            EditError::NotFound(_) => "Not found",
            EditError::Io { .. } => "File system error",
            EditError::Internal(_) => "Internal server error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    timestamp: u128,
}

impl ResponseError for EditError {
    fn status_code(&self) -> StatusCode {
        match self {
            EditError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            EditError::NotFound(_) => StatusCode::NOT_FOUND,
            EditError::Io { .. } | EditError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            EditError::Internal(detail) => {
                log::error!("Unexpected error: {}", detail);
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.label(),
            message,
            timestamp,
        })
    }
}
