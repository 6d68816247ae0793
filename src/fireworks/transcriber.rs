use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::dto::AudioUpload;
use crate::fireworks::config::TranscriptionConfig;
use crate::fireworks::prompt::TRANSCRIPTION_FIELDS;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("{status} {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &AudioUpload) -> Result<String, TranscriptionError>;
}

#[derive(Debug, serde::Deserialize)]
struct TranscriptionResponse {
    text: Option<String>,
}

pub struct FireworksTranscriber {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

impl FireworksTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// A non-200 always becomes `Status`, even when its body could not be read.
    fn parse_response(
        status: reqwest::StatusCode,
        body: Result<String, String>,
    ) -> Result<TranscriptionResponse, TranscriptionError> {
        if status != reqwest::StatusCode::OK {
            let body = body.unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            error!("Transcription service returned {status}: {body}");
            return Err(TranscriptionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = body.map_err(TranscriptionError::Request)?;
        serde_json::from_str(&body).map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))
    }

    fn build_form(audio: &AudioUpload) -> Form {
        let mut part = Part::bytes(audio.bytes.clone()).file_name(audio.filename.clone());
        if let Some(content_type) = &audio.content_type {
            part = match part.mime_str(content_type) {
                Ok(part) => part,
                Err(e) => {
                    debug!("Dropping unparseable content type '{content_type}': {e}");
                    Part::bytes(audio.bytes.clone()).file_name(audio.filename.clone())
                }
            };
        }

        TRANSCRIPTION_FIELDS
            .iter()
            .fold(Form::new().part("file", part), |form, (name, value)| {
                form.text(*name, *value)
            })
    }
}

#[async_trait]
impl Transcriber for FireworksTranscriber {
    async fn transcribe(&self, audio: &AudioUpload) -> Result<String, TranscriptionError> {
        info!(
            "Sending {} bytes of audio ('{}') for transcription",
            audio.bytes.len(),
            audio.filename
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .multipart(Self::build_form(audio))
            .send()
            .await
            .map_err(|e| {
                error!("Transcription request failed: {e}");
                TranscriptionError::Request(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string());
        let parsed = Self::parse_response(status, body)?;
        let text = parsed.text.unwrap_or_default();
        debug!("Transcription returned {} characters", text.len());

        Ok(text)
    }
}
