//! Fixed request parameters for both upstream services.

/// Multipart text fields sent alongside every audio upload.
pub const TRANSCRIPTION_FIELDS: &[(&str, &str)] = &[
    ("model", "whisper-v3-turbo"),
    ("temperature", "0"),
    ("vad_model", "silero"),
];

/// Generation parameters for the chat-completion call.
#[derive(Debug, Clone, Copy)]
pub struct ChatParams {
    pub model: &'static str,
    pub max_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub temperature: f64,
}

pub const CORRECTION_PARAMS: ChatParams = ChatParams {
    model: "accounts/fireworks/models/qwen3-30b-a3b",
    max_tokens: 5000,
    top_p: 1.0,
    top_k: 40,
    presence_penalty: 0.0,
    frequency_penalty: 0.0,
    temperature: 0.6,
};

pub const SYSTEM_PROMPT: &str = concat!(
    "You are an English teacher. Your task is to help the user improve their English text.\n\n",
    "1. First, show the corrected version of the user's text. Highlight each correction by ",
    "striking through the original mistake and showing the correction next to it, using this ",
    "format: ~~mistake~~ → correction. Use MarkdownV2 formatting for Telegram.\n\n",
    "2. Then, in a separate block, briefly explain the main mistakes. The explanation must be ",
    "concise and not longer than the user's original message. If the user's message is short, ",
    "your explanation should be even shorter. Do not write long explanations or multiple ",
    "paragraphs.\n\n",
    "Example output:\n",
    "*Corrected text:*\n",
    "~~I has~~ → I have a dog\\. ~~He like~~ → He likes to play\\.\n\n",
    "*Explanation:*\n",
    "Verb agreement: \"has\" → \"have\", \"like\" → \"likes\"\\.\n\n",
    "Now, process the following text:",
);
