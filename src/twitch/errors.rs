use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwitchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("App access token request rejected: {status} - {message}")]
    TokenRejected { status: u16, message: String },

    #[error("App access token has not been acquired")]
    NotAuthenticated,

    #[error("Helix API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}
