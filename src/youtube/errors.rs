use thiserror::Error;

#[derive(Error, Debug)]
pub enum YouTubeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API key is invalid or missing")]
    InvalidApiKey,

    #[error("Quota exceeded - please try again tomorrow")]
    QuotaExceeded,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("YouTube API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Page request failed: {status} ({url})")]
    PageError { status: u16, url: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}
