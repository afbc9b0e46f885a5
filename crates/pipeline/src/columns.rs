use wordcloud_protocol::Record;

/// Picks the field most likely to carry prose text.
///
/// Candidates are the first sampled record's fields; the score of a candidate
/// is the summed coerced-text length across the whole sample (missing and
/// null values count 0). Ties go to the first-encountered field. Returns
/// `None` only when the first record has no fields at all, which ends the
/// run early with an empty result rather than an error.
#[must_use]
pub fn select_column(sample: &[Record]) -> Option<String> {
    let first = sample.first()?;
    let mut best: Option<(&str, usize)> = None;
    for name in first.field_names() {
        let total: usize = sample.iter().map(|record| record.text_len(name)).sum();
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((name, total)),
        }
    }
    best.map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn picks_the_field_with_the_largest_summed_length() {
        let sample = vec![
            record(&[
                ("title", json!("a")),
                ("body", json!("the quick brown fox the fox")),
            ]),
            record(&[
                ("title", json!("b")),
                ("body", json!("the lazy dog the dog")),
            ]),
        ];
        assert_eq!(select_column(&sample), Some("body".to_string()));
    }

    #[test]
    fn ties_break_to_the_first_encountered_field() {
        let sample = vec![record(&[("alpha", json!("same")), ("beta", json!("same"))])];
        assert_eq!(select_column(&sample), Some("alpha".to_string()));
    }

    #[test]
    fn missing_and_null_values_score_zero() {
        let sample = vec![
            record(&[("title", json!("short")), ("body", json!(null))]),
            record(&[("title", json!("short too"))]),
        ];
        assert_eq!(select_column(&sample), Some("title".to_string()));
    }

    #[test]
    fn first_record_with_no_fields_yields_none() {
        let sample = vec![record(&[]), record(&[("body", json!("plenty of text"))])];
        assert_eq!(select_column(&sample), None);
    }

    #[test]
    fn empty_sample_yields_none() {
        assert_eq!(select_column(&[]), None);
    }

    #[test]
    fn numbers_score_by_their_display_length() {
        let sample = vec![record(&[("id", json!(1234567890u64)), ("tag", json!("ab"))])];
        assert_eq!(select_column(&sample), Some("id".to_string()));
    }
}
