use log::{debug, info};
use std::sync::Arc;

use crate::dto::{AudioUpload, CorrectionDto};
use crate::error::RelayError;
use crate::fireworks::corrector::TextCorrector;
use crate::fireworks::transcriber::Transcriber;

#[derive(Debug, Default)]
pub struct ProcessInput {
    pub text: Option<String>,
    pub audio: Option<AudioUpload>,
}

/// Optional transcription followed by LLM correction.
#[derive(Clone)]
pub struct CorrectionPipeline {
    transcriber: Arc<dyn Transcriber>,
    corrector: Arc<dyn TextCorrector>,
}

impl CorrectionPipeline {
    pub fn new(transcriber: Arc<dyn Transcriber>, corrector: Arc<dyn TextCorrector>) -> Self {
        Self {
            transcriber,
            corrector,
        }
    }

    /// Audio takes precedence over text when both are present.
    pub async fn run(&self, input: ProcessInput) -> Result<CorrectionDto, RelayError> {
        let text = match (input.audio, input.text) {
            (Some(audio), _) => {
                let transcript = self.transcriber.transcribe(&audio).await?;
                info!("Transcribed '{}' into {} characters", audio.filename, transcript.len());
                transcript
            }
            (None, None) => {
                return Err(RelayError::InvalidInput(
                    "Either text or an audio file must be provided".to_string(),
                ));
            }
            (None, Some(text)) if text.is_empty() => {
                return Err(RelayError::InvalidInput("Text must not be empty".to_string()));
            }
            (None, Some(text)) => text,
        };

        debug!("Forwarding {} characters for correction", text.len());
        Ok(self.corrector.correct(&text).await?)
    }
}
