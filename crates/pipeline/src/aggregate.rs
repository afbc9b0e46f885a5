use crate::config::WordCloudConfig;
use crate::dispatch::BatchResult;
use std::collections::HashMap;

/// Merges every successful batch's token lists into one frequency map.
///
/// Tokens are lowercased and trimmed; only tokens whose char length lies
/// strictly inside the `(min_token_length, max_token_length)` band count.
/// Failed batches contribute nothing. The merge is pure and commutative:
/// aggregating batches in any order yields an identical map.
#[must_use]
pub fn aggregate(batches: &[BatchResult], config: &WordCloudConfig) -> HashMap<String, u64> {
    let mut frequencies = HashMap::new();
    for batch in batches {
        let Ok(token_lists) = batch else {
            continue;
        };
        for words in token_lists {
            for word in words {
                if let Some(token) = normalize_token(word, config) {
                    *frequencies.entry(token).or_insert(0) += 1;
                }
            }
        }
    }
    frequencies
}

fn normalize_token(raw: &str, config: &WordCloudConfig) -> Option<String> {
    let token = raw.trim().to_lowercase();
    let len = token.chars().count();
    (len > config.min_token_length && len < config.max_token_length).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::BatchFailure;
    use pretty_assertions::assert_eq;

    fn batch(token_lists: &[&[&str]]) -> BatchResult {
        Ok(token_lists
            .iter()
            .map(|words| words.iter().map(|w| (*w).to_string()).collect())
            .collect())
    }

    fn failed(batch_index: usize) -> BatchResult {
        Err(BatchFailure {
            batch_index,
            reason: "status 503".to_string(),
        })
    }

    #[test]
    fn counts_normalized_tokens_across_batches() {
        let config = WordCloudConfig::default();
        let batches = vec![
            batch(&[&["Fox", " fox "], &["quick"]]),
            batch(&[&["FOX", "brown"]]),
        ];
        let map = aggregate(&batches, &config);
        assert_eq!(map.get("fox"), Some(&3));
        assert_eq!(map.get("quick"), Some(&1));
        assert_eq!(map.get("brown"), Some(&1));
    }

    #[test]
    fn tokens_outside_the_length_band_are_discarded() {
        let config = WordCloudConfig::default();
        let long = "x".repeat(25);
        let edge = "y".repeat(24);
        let batches = vec![batch(&[&["ab", "abc", long.as_str(), edge.as_str()]])];
        let map = aggregate(&batches, &config);
        assert_eq!(map.get("ab"), None); // length 2 excluded
        assert_eq!(map.get("abc"), Some(&1)); // length 3 kept
        assert_eq!(map.get(long.as_str()), None); // length 25 excluded
        assert_eq!(map.get(edge.as_str()), Some(&1)); // length 24 kept
    }

    #[test]
    fn failed_batches_contribute_nothing() {
        let config = WordCloudConfig::default();
        let batches = vec![batch(&[&["dog", "dog"]]), failed(1)];
        let map = aggregate(&batches, &config);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("dog"), Some(&2));
    }

    #[test]
    fn merge_is_commutative() {
        let config = WordCloudConfig::default();
        let b1 = batch(&[&["fox", "dog", "fox"]]);
        let b2 = batch(&[&["dog", "lazy"]]);
        let b3 = failed(2);

        let forward = aggregate(&[b1.clone(), b2.clone(), b3.clone()], &config);
        let reversed = aggregate(&[b3, b2, b1], &config);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn whitespace_only_tokens_are_dropped() {
        let config = WordCloudConfig::default();
        let map = aggregate(&[batch(&[&["   ", "\t", "word here"]])], &config);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("word here"), Some(&1));
    }
}
