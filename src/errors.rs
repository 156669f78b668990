use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Message shown to clients instead of internal store failures.
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Could not reach the item store at the moment.";

/// Failures of the item store and its snapshot file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("item store lock poisoned")]
    Poisoned,

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Failures while loading `config.json`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("items_path {0:?} must start with '/', must not end with '/' and must not be '/'")]
    InvalidItemsPath(String),
}

/// One rejected field of a write payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub msg: String,
    pub param: String,
    pub location: String,
}

impl FieldError {
    pub fn body(param: &str, value: Option<Value>, msg: impl Into<String>) -> Self {
        Self {
            value,
            msg: msg.into(),
            param: param.to_string(),
            location: "body".to_string(),
        }
    }
}

/// Everything an item request can fail with, mapped to a status code at the
/// HTTP boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Invalid ID")]
    MalformedId,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Request body is too large")]
    PayloadTooLarge,

    #[error("No item with that id")]
    NotFound,

    #[error("Could not delete all items: there is nothing to delete.")]
    NothingToDelete,

    #[error("Not Found -- {0}")]
    RouteNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

#[derive(Debug, Serialize)]
struct ValidationBody<'a> {
    errors: &'a [FieldError],
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MalformedId | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound | ApiError::NothingToDelete | ApiError::RouteNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::MalformedId => "malformed_id",
            ApiError::MalformedBody(_) => "malformed_body",
            ApiError::PayloadTooLarge => "payload_too_large",
            ApiError::NotFound => "not_found",
            ApiError::NothingToDelete => "nothing_to_delete",
            ApiError::RouteNotFound(_) => "route_not_found",
            ApiError::Store(_) => "store_error",
        }
    }

    /// The message a client is allowed to see. Store failures never leak
    /// their detail.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Store(_) => STORE_UNAVAILABLE_MESSAGE.to_string(),
            ApiError::Validation(fields) => fields
                .iter()
                .map(|f| format!("{}: {}", f.param, f.msg))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }

    /// Logs server-side failures before they are rendered.
    pub(crate) fn log(&self) {
        if let ApiError::Store(e) = self {
            tracing::error!("Item store failure: {e}");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status();
        if let ApiError::Validation(fields) = &self {
            return (status, Json(ValidationBody { errors: fields })).into_response();
        }

        let body = ErrorBody {
            error: self.public_message(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_hide_their_detail() {
        let err = ApiError::from(StoreError::Poisoned);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), STORE_UNAVAILABLE_MESSAGE);
        assert!(!err.public_message().contains("poisoned"));
    }

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        assert_eq!(
            ApiError::Validation(vec![]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::MalformedId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NothingToDelete.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::RouteNotFound("/nope".into()).to_string(),
            "Not Found -- /nope"
        );
    }

    #[test]
    fn validation_message_lists_fields() {
        let err = ApiError::Validation(vec![FieldError::body(
            "name",
            None,
            "Name is required",
        )]);
        assert_eq!(err.public_message(), "name: Name is required");
    }
}
