use std::cmp::Reverse;
use std::collections::HashMap;
use wordcloud_protocol::FrequencyEntry;

/// Filters and ranks the frequency map into the published result.
///
/// Keeps entries whose count is strictly above `min_count`, sorts by count
/// descending with ties broken by token text ascending (deterministic for
/// identical input), and truncates to the first `k` entries.
#[must_use]
pub fn select_top(frequencies: &HashMap<String, u64>, min_count: u64, k: usize) -> Vec<FrequencyEntry> {
    let mut entries: Vec<FrequencyEntry> = frequencies
        .iter()
        .filter(|(_, &value)| value > min_count)
        .map(|(text, &value)| FrequencyEntry::new(text.clone(), value))
        .collect();
    entries.sort_by(|a, b| {
        (Reverse(a.value), &a.text).cmp(&(Reverse(b.value), &b.text))
    });
    entries.truncate(k);
    entries
}
