//! Error taxonomy for the HTTP surface
//!
//! Validation failures are recovered into a structured 422 with per-field
//! detail; inference failures surface as an opaque 500 with the cause kept
//! in the server log.

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::error;

/// A single offending field in a rejected request.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Malformed or missing input, with every offending field named.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Build a validation error out of a JSON body rejection.
    ///
    /// serde_json names the field in backticks (``missing field `V7` ``);
    /// when no field can be picked out the error is attributed to the body
    /// as a whole.
    pub fn from_payload_error(err: &JsonPayloadError) -> Self {
        let message = err.to_string();
        let field = field_from_serde_message(&message)
            .unwrap_or("body")
            .to_string();
        Self {
            errors: vec![FieldError { field, message }],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Errors a request can fail with after routing.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unprocessable transaction: {0}")]
    Validation(ValidationError),
    #[error("inference failed: {0}")]
    Inference(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(validation) => {
                HttpResponse::UnprocessableEntity().json(ErrorBody {
                    error: "unprocessable transaction",
                    errors: Some(&validation.errors),
                })
            }
            ApiError::Inference(cause) => {
                // Full cause stays server-side
                error!(error = %cause, "Inference failed");
                HttpResponse::InternalServerError().json(ErrorBody {
                    error: "internal error",
                    errors: None,
                })
            }
        }
    }
}

/// Map JSON body rejections onto the 422 contract.
///
/// Wired into `web::JsonConfig` so that missing fields, unknown fields and
/// non-numeric values all come back in the same shape as post-parse
/// validation failures.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(ValidationError::from_payload_error(&err)).into()
}

fn field_from_serde_message(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let end = message[start..].find('`')? + start;
    Some(&message[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_field_extracted_from_serde_message() {
        let message = "Json deserialize error: missing field `V7` at line 1 column 412";
        assert_eq!(field_from_serde_message(message), Some("V7"));
        assert_eq!(field_from_serde_message("no backticks here"), None);
    }

    #[test]
    fn test_validation_status() {
        let err = ApiError::Validation(ValidationError::single("V7", "must be a finite number"));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_inference_status() {
        let err = ApiError::Inference(anyhow::anyhow!("tensor shape mismatch"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_validation_body_names_the_field() {
        let err = ApiError::Validation(ValidationError::single("V7", "must be a finite number"));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("V7"), "body was: {text}");
    }

    #[actix_web::test]
    async fn test_inference_body_is_opaque() {
        let err = ApiError::Inference(anyhow::anyhow!("tensor shape mismatch in session run"));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(!text.contains("tensor"), "leaked internal detail: {text}");
        assert!(text.contains("internal error"));
    }
}
