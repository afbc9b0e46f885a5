use crate::config::WordCloudConfig;
use wordcloud_protocol::Record;

/// Pulls the bounded text corpus for a run.
///
/// Reads `column` from the first `max_texts` records, coerces scalars to
/// strings, truncates anything longer than `max_text_length` chars (the tail
/// is dropped, never split into a second entry) and discards entries whose
/// length is at or under `min_text_length`. Input order is preserved.
///
/// Guarantees: output length ≤ `max_texts`; every element's char length is
/// in `(min_text_length, max_text_length]`.
#[must_use]
pub fn extract_bounded(records: &[Record], column: &str, config: &WordCloudConfig) -> Vec<String> {
    records
        .iter()
        .take(config.max_texts)
        .filter_map(|record| record.scalar_text(column))
        .map(|text| truncate_chars(text, config.max_text_length))
        .filter(|text| text.chars().count() > config.min_text_length)
        .collect()
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text,
    }
}
