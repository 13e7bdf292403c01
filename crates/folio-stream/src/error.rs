use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body broke off mid-stream
    #[error("Stream error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, StreamError>;
