#[derive(Debug)]
pub struct ClientConfig {
    pub server_url: String,
    pub text: Option<String>,
    pub audio_file: Option<String>,
}

impl ClientConfig {
    pub fn new_text_mode(server_url: String, text: String) -> Self {
        Self {
            server_url,
            text: Some(text),
            audio_file: None,
        }
    }

    pub fn new_file_mode(server_url: String, audio_file: String) -> Self {
        Self {
            server_url,
            text: None,
            audio_file: Some(audio_file),
        }
    }
}
