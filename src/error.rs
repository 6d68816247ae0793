use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::dto::ErrorDto;
use crate::fireworks::corrector::CorrectionError;
use crate::fireworks::transcriber::TranscriptionError;

/// Every way a `/process` request can fail, mapped onto an HTTP status.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Correction(#[from] CorrectionError),
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::Transcription(_) => StatusCode::BAD_GATEWAY,
            RelayError::Correction(CorrectionError::Unauthorized) => StatusCode::FORBIDDEN,
            RelayError::Correction(CorrectionError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Correction(CorrectionError::Upstream { .. })
            | RelayError::Correction(CorrectionError::Unknown(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorDto {
            detail: self.to_string(),
        })
    }
}
