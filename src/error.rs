use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

pub const GENERIC_ERROR_MESSAGE: &str = "Terjadi kesalahan pada server";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON body rejected: {0}")]
    Json(#[from] axum::extract::rejection::JsonRejection),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{message}: {source}")]
    Failed {
        message: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_)
            | Error::Validation(_)
            | Error::Json(_)
            | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) | Error::Token(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Error::Config(_)
            | Error::Database(_)
            | Error::Mail(_)
            | Error::Internal(_)
            | Error::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Replaces the generic text of a server-side failure with an
    /// operation-specific one. Client errors pass through unchanged.
    pub fn or_fail(self, message: &'static str) -> Error {
        if self.status_code().is_server_error() {
            Error::Failed {
                message,
                source: Box::new(self),
            }
        } else {
            self
        }
    }

    /// Text shown to the caller. Server-side failures are replaced by a
    /// generic message and only their details are logged.
    pub fn public_message(&self) -> String {
        match self {
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg) => msg.clone(),
            Error::Validation(errors) => first_validation_message(errors),
            Error::Json(_) => "Format data tidak valid".to_string(),
            Error::Multipart(_) => "Data formulir tidak valid".to_string(),
            Error::Token(_) => "Sesi tidak valid, silakan login kembali".to_string(),
            Error::RateLimited => "Terlalu banyak permintaan, coba lagi nanti".to_string(),
            Error::Failed { message, .. } => message.to_string(),
            Error::Config(_) | Error::Database(_) | Error::Mail(_) | Error::Internal(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }
}

fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Field {} tidak valid", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Data tidak valid".to_string())
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        let body = Json(json!({ "success": false, "message": self.public_message() }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Data tidak ditemukan".to_string()),
            other => Error::Database(other),
        }
    }
}
