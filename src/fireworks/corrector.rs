use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dto::CorrectionDto;
use crate::fireworks::config::CorrectionConfig;
use crate::fireworks::prompt::{CORRECTION_PARAMS, ChatParams, SYSTEM_PROMPT};

#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("Unauthorized: check the LLM API key")]
    Unauthorized,

    #[error("LLM error: {status} {body}")]
    Upstream { status: u16, body: String },

    #[error("LLM API timeout")]
    Timeout,

    #[error("LLM unknown error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for CorrectionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CorrectionError::Timeout
        } else {
            CorrectionError::Unknown(e.to_string())
        }
    }
}

#[async_trait]
pub trait TextCorrector: Send + Sync {
    async fn correct(&self, text: &str) -> Result<CorrectionDto, CorrectionError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'static str,
    max_tokens: u32,
    top_p: f64,
    top_k: u32,
    presence_penalty: f64,
    frequency_penalty: f64,
    temperature: f64,
    messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatRequest<'a> {
    fn new(params: &ChatParams, text: &'a str) -> Self {
        Self {
            model: params.model,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            top_k: params.top_k,
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
            temperature: params.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// `choices[0].message.content`, or empty when any link is missing.
    fn into_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

pub struct FireworksCorrector {
    client: reqwest::Client,
    config: CorrectionConfig,
}

impl FireworksCorrector {
    pub fn new(config: CorrectionConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextCorrector for FireworksCorrector {
    async fn correct(&self, text: &str) -> Result<CorrectionDto, CorrectionError> {
        info!("Requesting correction for {} characters", text.len());

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.config.api_key)
            .json(&ChatRequest::new(&CORRECTION_PARAMS, text))
            .send()
            .await
            .map_err(|e| {
                error!("LLM request failed: {e}");
                CorrectionError::from(e)
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            warn!("LLM service rejected the API key");
            return Err(CorrectionError::Unauthorized);
        }

        let body = response.text().await?;
        if status != reqwest::StatusCode::OK {
            error!("LLM service returned {status}: {body}");
            return Err(CorrectionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| CorrectionError::Unknown(e.to_string()))?;
        let result = parsed.into_content();
        debug!("LLM returned {} characters", result.len());

        Ok(CorrectionDto { result })
    }
}
