use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FacetryError {
    #[error("Duplicate record id: {0}")]
    DuplicateRecordId(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Duplicate facet id: {0}")]
    DuplicateFacet(String),

    #[error("Facet {facet} of kind {facet_kind} cannot use attribute {attribute} of kind {attribute_kind}")]
    IncompatibleFacet {
        facet: String,
        facet_kind: String,
        attribute: String,
        attribute_kind: String,
    },

    #[error("Invalid facet {facet}: {reason}")]
    InvalidFacet { facet: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown facet: {0}")]
    UnknownFacet(String),

    #[error("Invalid selection for facet {facet}: {reason}")]
    InvalidSelection { facet: String, reason: String },

    #[error("Attribute cannot be sorted on: {0}")]
    UnsortableAttribute(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Too many sessions: {current} active, max {max}")]
    TooManySessions { current: usize, max: usize },

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, FacetryError>;

impl From<std::io::Error> for FacetryError {
    fn from(e: std::io::Error) -> Self {
        FacetryError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FacetryError {
    fn from(e: serde_json::Error) -> Self {
        FacetryError::Json(e.to_string())
    }
}

impl FacetryError {
    pub(crate) fn invalid_selection(facet: &str, reason: impl Into<String>) -> Self {
        FacetryError::InvalidSelection {
            facet: facet.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_facet(facet: &str, reason: impl Into<String>) -> Self {
        FacetryError::InvalidFacet {
            facet: facet.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors raised while loading records or defining facets. These are fatal
    /// for the call that produced them and retrying with the same input fails
    /// the same way.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FacetryError::DuplicateRecordId(_)
                | FacetryError::UnknownAttribute(_)
                | FacetryError::DuplicateFacet(_)
                | FacetryError::IncompatibleFacet { .. }
                | FacetryError::InvalidFacet { .. }
                | FacetryError::Config(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            FacetryError::DuplicateRecordId(_) => StatusCode::BAD_REQUEST,
            FacetryError::UnknownAttribute(_) => StatusCode::BAD_REQUEST,
            FacetryError::DuplicateFacet(_) => StatusCode::BAD_REQUEST,
            FacetryError::IncompatibleFacet { .. } => StatusCode::BAD_REQUEST,
            FacetryError::InvalidFacet { .. } => StatusCode::BAD_REQUEST,
            FacetryError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FacetryError::UnknownFacet(_) => StatusCode::NOT_FOUND,
            FacetryError::InvalidSelection { .. } => StatusCode::BAD_REQUEST,
            FacetryError::UnsortableAttribute(_) => StatusCode::BAD_REQUEST,
            FacetryError::InvalidDocument(_) => StatusCode::BAD_REQUEST,
            FacetryError::MissingField(_) => StatusCode::BAD_REQUEST,
            FacetryError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            FacetryError::TooManySessions { .. } => StatusCode::SERVICE_UNAVAILABLE,
            FacetryError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FacetryError::Json(_) => StatusCode::BAD_REQUEST,
        }
    }
}


// Axum IntoResponse implementation (feature-gated)
#[cfg(feature = "axum-support")]
use axum::response::{IntoResponse, Json, Response};
#[cfg(feature = "axum-support")]
use serde::Serialize;

#[cfg(feature = "axum-support")]
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub request_id: String,
}

#[cfg(feature = "axum-support")]
impl FacetryError {
    fn error_code(&self) -> &'static str {
        match self {
            FacetryError::DuplicateRecordId(_) => "duplicate_record_id",
            FacetryError::UnknownAttribute(_) => "unknown_attribute",
            FacetryError::DuplicateFacet(_) => "duplicate_facet",
            FacetryError::IncompatibleFacet { .. } => "incompatible_facet",
            FacetryError::InvalidFacet { .. } => "invalid_facet",
            FacetryError::Config(_) => "config_error",
            FacetryError::UnknownFacet(_) => "unknown_facet",
            FacetryError::InvalidSelection { .. } => "invalid_selection",
            FacetryError::UnsortableAttribute(_) => "unsortable_attribute",
            FacetryError::InvalidDocument(_) => "invalid_document",
            FacetryError::MissingField(_) => "missing_field",
            FacetryError::SessionNotFound(_) => "session_not_found",
            FacetryError::TooManySessions { .. } => "too_many_sessions",
            FacetryError::Io(_) => "io_error",
            FacetryError::Json(_) => "json_error",
        }
    }
}

#[cfg(feature = "axum-support")]
impl IntoResponse for FacetryError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            request_id: format!("req_fc_{}", uuid::Uuid::new_v4()),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
