use thiserror::Error;

pub type Result<T> = std::result::Result<T, TokenizerError>;

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("transport error: {0}")]
    Transport(#[from] hyper::Error),

    #[error("request build error: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("tokenizer service returned status {0}")]
    Status(u16),

    #[error("malformed tokenizer response: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid tokenizer endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("{0}")]
    Other(String),
}
