use crate::error::{PipelineError, Result};
use std::time::Duration;

/// Knobs for one word cloud pipeline instance.
///
/// The defaults are the reference behavior; they are exposed for tests and
/// tuning but changing them changes what the published cloud looks like.
#[derive(Debug, Clone)]
pub struct WordCloudConfig {
    /// Quiet period between the last trigger and the start of gating.
    pub debounce: Duration,
    /// Prefix sample size used by the column selector.
    pub sample_size: usize,
    /// Skip the column heuristic and read this field instead.
    pub column_override: Option<String>,
    /// At most this many records contribute text to a run.
    pub max_texts: usize,
    /// Texts longer than this are truncated (tail dropped, never split).
    pub max_text_length: usize,
    /// Texts at or under this length are discarded.
    pub min_text_length: usize,
    /// Number of texts per tokenizer call.
    pub batch_size: usize,
    /// Token cap per individual text, forwarded to the tokenizer service.
    pub max_tokens_per_text: usize,
    /// Ask the service for its cloud-oriented token stream.
    pub cloud: bool,
    /// Tokens must be strictly longer than this many chars to count.
    pub min_token_length: usize,
    /// Tokens must be strictly shorter than this many chars to count.
    pub max_token_length: usize,
    /// Entries must have a count strictly above this to be published.
    pub min_count: u64,
    /// Published result is truncated to this many entries.
    pub top_k: usize,
    /// Per-batch tokenizer call timeout; a timeout is a batch failure.
    pub batch_timeout: Duration,
    /// How long the 100% progress value stays visible before resetting to 0.
    pub progress_reset_delay: Duration,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1_000),
            sample_size: 10,
            column_override: None,
            max_texts: 2_000,
            max_text_length: 5_000,
            min_text_length: 10,
            batch_size: 100,
            max_tokens_per_text: 200,
            cloud: true,
            min_token_length: 2,
            max_token_length: 25,
            min_count: 1,
            top_k: 150,
            batch_timeout: Duration::from_secs(30),
            progress_reset_delay: Duration::from_millis(400),
        }
    }
}

impl WordCloudConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_texts == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_texts must be at least 1".to_string(),
            ));
        }
        if self.sample_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "sample_size must be at least 1".to_string(),
            ));
        }
        if self.max_text_length <= self.min_text_length {
            return Err(PipelineError::InvalidConfig(format!(
                "max_text_length ({}) must exceed min_text_length ({})",
                self.max_text_length, self.min_text_length
            )));
        }
        if self.max_token_length <= self.min_token_length {
            return Err(PipelineError::InvalidConfig(format!(
                "max_token_length ({}) must exceed min_token_length ({})",
                self.max_token_length, self.min_token_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = WordCloudConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(1_000));
        assert_eq!(config.sample_size, 10);
        assert_eq!(config.max_texts, 2_000);
        assert_eq!(config.max_text_length, 5_000);
        assert_eq!(config.min_text_length, 10);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.max_tokens_per_text, 200);
        assert_eq!(config.min_token_length, 2);
        assert_eq!(config.max_token_length, 25);
        assert_eq!(config.min_count, 1);
        assert_eq!(config.top_k, 150);
        assert!(config.column_override.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = WordCloudConfig {
            batch_size: 0,
            ..WordCloudConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_length_band_is_rejected() {
        let config = WordCloudConfig {
            min_token_length: 25,
            max_token_length: 2,
            ..WordCloudConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
