#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CorrectionDto {
    pub result: String,
}

#[derive(serde::Serialize)]
pub struct ErrorDto {
    pub detail: String,
}

/// Urlencoded body of `POST /process`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ProcessForm {
    pub text: Option<String>,
}

/// An uploaded audio file, forwarded to the transcription service as-is.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}
