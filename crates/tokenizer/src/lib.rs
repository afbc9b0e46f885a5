//! # Word Cloud Tokenizer
//!
//! Client side of the external tokenization service consumed by the word
//! cloud pipeline. The service accepts a batch of texts and returns one
//! token list per text, in the same order:
//!
//! ```text
//! POST { "texts": [..], "cloud": true, "maxTokensPerText": 200 }
//!  -->  { "results": [ { "words": [..] }, .. ] }
//! ```
//!
//! Two backends are provided: [`HttpTokenizer`] for the real service and
//! [`StubTokenizer`] (whitespace splitting) for tests and offline use,
//! selected via the `WORDCLOUD_TOKENIZER_MODE` environment variable.

mod error;
mod http;
mod stub;

pub use error::{Result, TokenizerError};
pub use http::HttpTokenizer;
pub use stub::StubTokenizer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;

/// Per-call knobs forwarded to the tokenizer service.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeOptions {
    /// Ask the service for its cloud-oriented token stream.
    pub cloud: bool,
    /// Upper bound on tokens produced per individual text.
    pub max_tokens_per_text: usize,
}

/// Token list for one input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextTokens {
    pub words: Vec<String>,
}

/// Whole-batch response: one entry per input text, same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeResponse {
    pub results: Vec<TextTokens>,
}

#[async_trait]
pub trait Tokenizer: Send + Sync {
    /// Tokenizes one batch of texts. A failure here fails the whole batch;
    /// the caller decides whether sibling batches keep going.
    async fn tokenize(&self, texts: &[String], options: TokenizeOptions)
        -> Result<TokenizeResponse>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenizerMode {
    Remote,
    Stub,
}

impl TokenizerMode {
    pub fn from_env() -> Result<Self> {
        let raw = env::var("WORDCLOUD_TOKENIZER_MODE")
            .unwrap_or_else(|_| "remote".to_string())
            .to_ascii_lowercase();
        match raw.as_str() {
            "remote" => Ok(Self::Remote),
            "stub" => Ok(Self::Stub),
            other => Err(TokenizerError::Other(format!(
                "Unsupported WORDCLOUD_TOKENIZER_MODE '{other}' (expected 'remote' or 'stub')"
            ))),
        }
    }
}

/// Builds the tokenizer selected by `WORDCLOUD_TOKENIZER_MODE`.
pub fn tokenizer_from_env(endpoint: &str) -> Result<Arc<dyn Tokenizer>> {
    match TokenizerMode::from_env()? {
        TokenizerMode::Remote => Ok(Arc::new(HttpTokenizer::new(endpoint)?)),
        TokenizerMode::Stub => Ok(Arc::new(StubTokenizer::new())),
    }
}
