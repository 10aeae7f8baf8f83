use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::model::ModelError;

/// Everything that can go wrong while serving one prediction. Input
/// problems map to 400; anything raised past validation maps to 500.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Missing detection_type or image")]
    MissingField,
    #[error("Invalid file format. Allowed formats: jpg, jpeg, png, gif")]
    InvalidExtension,
    #[error("Invalid detection_type. Use \"soil\" or \"pest\".")]
    InvalidDetectionType,
    #[error("Invalid image format")]
    InvalidImage,
    #[error("Malformed multipart payload: {0}")]
    Multipart(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ModelError> for PredictError {
    fn from(err: ModelError) -> Self {
        PredictError::Internal(err.to_string())
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        if let PredictError::Internal(detail) = &self {
            error!("prediction failed: {detail}");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_400() {
        for err in [
            PredictError::MissingField,
            PredictError::InvalidExtension,
            PredictError::InvalidDetectionType,
            PredictError::InvalidImage,
            PredictError::Multipart("truncated".into()),
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn internal_errors_map_to_500() {
        let err = PredictError::Internal("session run failed".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_match_the_http_contract() {
        assert_eq!(
            PredictError::MissingField.to_string(),
            "Missing detection_type or image"
        );
        assert_eq!(
            PredictError::InvalidExtension.to_string(),
            "Invalid file format. Allowed formats: jpg, jpeg, png, gif"
        );
        assert_eq!(
            PredictError::InvalidDetectionType.to_string(),
            "Invalid detection_type. Use \"soil\" or \"pest\"."
        );
        assert_eq!(PredictError::InvalidImage.to_string(), "Invalid image format");
        assert_eq!(
            PredictError::Internal("boom".into()).to_string(),
            "Internal server error: boom"
        );
    }

    #[test]
    fn model_errors_become_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing graph");
        let err: PredictError = PredictError::from(ModelError::Io(io));
        assert!(matches!(err, PredictError::Internal(_)));
    }
}
