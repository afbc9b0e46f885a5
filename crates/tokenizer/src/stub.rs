use crate::{Result, TextTokens, TokenizeOptions, TokenizeResponse, Tokenizer};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Offline tokenizer: whitespace splitting, honoring `max_tokens_per_text`.
///
/// Counts batch calls so tests can assert how often the service would have
/// been hit (e.g. that an empty run performs no call at all).
#[derive(Clone, Default)]
pub struct StubTokenizer {
    batch_calls: Arc<AtomicUsize>,
}

impl StubTokenizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Tokenizer for StubTokenizer {
    async fn tokenize(
        &self,
        texts: &[String],
        options: TokenizeOptions,
    ) -> Result<TokenizeResponse> {
        self.batch_calls.fetch_add(1, Ordering::Relaxed);
        let results = texts
            .iter()
            .map(|text| TextTokens {
                words: text
                    .split_whitespace()
                    .take(options.max_tokens_per_text)
                    .map(str::to_string)
                    .collect(),
            })
            .collect();
        Ok(TokenizeResponse { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OPTIONS: TokenizeOptions = TokenizeOptions {
        cloud: true,
        max_tokens_per_text: 3,
    };

    #[tokio::test]
    async fn splits_on_whitespace_one_result_per_text() {
        let stub = StubTokenizer::new();
        let texts = vec!["the quick fox".to_string(), "lazy dog".to_string()];
        let response = stub.tokenize(&texts, OPTIONS).await.expect("tokenize");
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].words, vec!["the", "quick", "fox"]);
        assert_eq!(response.results[1].words, vec!["lazy", "dog"]);
        assert_eq!(stub.batch_calls(), 1);
    }

    #[tokio::test]
    async fn caps_tokens_per_text() {
        let stub = StubTokenizer::new();
        let texts = vec!["a b c d e f".to_string()];
        let response = stub.tokenize(&texts, OPTIONS).await.expect("tokenize");
        assert_eq!(response.results[0].words.len(), 3);
    }
}
