use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Database error")]
    Database(#[from] DatabaseError),

    #[error("Mail delivery failed")]
    Mail(#[from] MailError),

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Schema validation failure for a settings sub-document.
///
/// Raised only when a present field has the wrong shape; absent fields are
/// filled with defaults and never error.
#[derive(Error, Debug)]
#[error("Invalid {domain} settings: {detail}")]
pub struct ValidationError {
    pub domain: String,
    pub detail: String,
}

impl ValidationError {
    pub fn new(domain: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            detail: detail.into(),
        }
    }
}

/// Database errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed")]
    Connection(#[source] rusqlite::Error),

    #[error("Query failed")]
    Query(#[source] rusqlite::Error),

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Serialization failed")]
    Serialization(#[source] serde_json::Error),
}

/// Outbound provider errors (AI gateway, storage, payment).
///
/// The connection prober captures these as log lines in its result; the
/// thread generator is the only path that surfaces them to a caller.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} is not configured: {message}")]
    Unconfigured { provider: String, message: String },

    #[error("Connection failed to {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} request failed (status {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}")]
    InvalidResponse {
        provider: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Mail provider errors for the direct send path
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail provider rejected the send (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Connection to mail provider failed")]
    Transport(#[source] reqwest::Error),

    #[error("Invalid response from mail provider")]
    InvalidResponse(#[source] serde_json::Error),
}

/// API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Provider(ProviderError::Unconfigured { .. }) => StatusCode::BAD_REQUEST,
            ServiceError::Provider(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::Forbidden { .. } => "forbidden",
            ServiceError::Database(_) => "database_error",
            ServiceError::Mail(_) => "mail_delivery_error",
            ServiceError::Provider(ProviderError::Unconfigured { .. }) => "provider_unconfigured",
            ServiceError::Provider(_) => "provider_error",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Config { .. } => "config_error",
            ServiceError::Internal { .. } => "internal_error",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServiceError::Validation(err) => Some(serde_json::json!({
                "domain": err.domain,
                "detail": err.detail,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();
        let details = self.details();

        let response = ErrorResponse {
            message: self.to_string(),
            code: Some(code),
            details,
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
