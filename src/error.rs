use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::services::gemini::LlmError;
use crate::services::image::ImageError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "detail": self.to_string()
        }))
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Decode(_) => AppError::BadRequest(err.to_string()),
            ImageError::Encode(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Internal(format!("Error processing request: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_decode_errors_are_client_errors() {
        let err: AppError = ImageError::Decode("bad header".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("bad header"));
    }

    #[test]
    fn llm_errors_are_server_errors() {
        let err: AppError = LlmError::MissingApiKey.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
