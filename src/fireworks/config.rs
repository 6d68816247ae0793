use anyhow::{Result, anyhow};
use dotenv::dotenv;
use std::time::Duration;

pub const DEFAULT_TRANSCRIPTION_URL: &str =
    "https://audio-turbo.us-virginia-1.direct.fireworks.ai/v1/audio/transcriptions";
pub const DEFAULT_LLM_URL: &str = "https://api.fireworks.ai/inference/v1/chat/completions";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

const SHARED_KEY_VAR: &str = "FIREWORKS_API_KEY";
const TRANSCRIPTION_KEY_VAR: &str = "FIREWORKS_TRANSCRIPTION_API_KEY";
const LLM_KEY_VAR: &str = "FIREWORKS_LLM_API_KEY";
const TRANSCRIPTION_URL_VAR: &str = "FIREWORKS_TRANSCRIPTION_URL";
const LLM_URL_VAR: &str = "FIREWORKS_LLM_URL";
const LLM_TIMEOUT_VAR: &str = "FIREWORKS_LLM_TIMEOUT_SECS";

/// Connection settings for the speech-to-text service.
#[derive(Clone, Debug)]
pub struct TranscriptionConfig {
    pub endpoint: String,
    pub api_key: String,
}

/// Connection settings for the chat-completion service.
#[derive(Clone, Debug)]
pub struct CorrectionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Process-wide upstream configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct FireworksConfig {
    pub transcription: TranscriptionConfig,
    pub correction: CorrectionConfig,
}

impl FireworksConfig {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let shared_key = get(SHARED_KEY_VAR);

        let transcription_key = get(TRANSCRIPTION_KEY_VAR)
            .or_else(|| shared_key.clone())
            .ok_or_else(|| anyhow!("{TRANSCRIPTION_KEY_VAR} or {SHARED_KEY_VAR} is not set"))?;
        let llm_key = get(LLM_KEY_VAR)
            .or(shared_key)
            .ok_or_else(|| anyhow!("{LLM_KEY_VAR} or {SHARED_KEY_VAR} is not set"))?;

        let timeout_secs = match get(LLM_TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow!("Invalid {LLM_TIMEOUT_VAR} value '{raw}': {e}"))?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };

        Ok(Self {
            transcription: TranscriptionConfig {
                endpoint: get(TRANSCRIPTION_URL_VAR)
                    .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_URL.to_string()),
                api_key: transcription_key,
            },
            correction: CorrectionConfig {
                endpoint: get(LLM_URL_VAR).unwrap_or_else(|| DEFAULT_LLM_URL.to_string()),
                api_key: llm_key,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}
