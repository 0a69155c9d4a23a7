use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Non-JSON response: {0}")]
    PayloadParse(#[from] serde_json::Error),

    #[error("Captions JSON has no events")]
    EmptyEvents,

    #[error("No captions URL captured. Enable captions and play the video.")]
    NoCandidates,

    #[error("Could not fetch a valid captions JSON. Try playing the video with CC on, then retry.")]
    NoValidCaptions,

    #[error("Transcript is empty after cleaning.")]
    EmptyTranscript,

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("Text generation error: {status} {body}")]
    ExternalService { status: u16, body: String },

    #[error("Text generation response did not include output text.")]
    NoOutputText,
}

pub type Result<T> = std::result::Result<T, SummarizeError>;
