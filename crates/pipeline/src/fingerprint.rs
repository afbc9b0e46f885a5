use sha2::{Digest, Sha256};
use wordcloud_protocol::Record;

/// Upper bound on how much of the first record's schema feeds the digest.
const SCHEMA_PREFIX_CHARS: usize = 64;

/// Cheap identity for an input set: record count plus a digest of the first
/// record's field names (bounded prefix). Equal fingerprints are treated as
/// "same input" for recomputation purposes. This is a heuristic; two sets
/// with the same length and leading schema but different contents collide,
/// and a missed recomputation is the accepted tradeoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunFingerprint {
    /// Empty input set. Never gates a run; an empty set always executes a
    /// (trivial) run that publishes an empty result.
    Empty,
    Set {
        record_count: usize,
        schema_digest: u64,
    },
}

impl RunFingerprint {
    #[must_use]
    pub fn compute(records: &[Record]) -> Self {
        let Some(first) = records.first() else {
            return Self::Empty;
        };
        let mut schema = String::new();
        for name in first.field_names() {
            if schema.chars().count() >= SCHEMA_PREFIX_CHARS {
                break;
            }
            schema.push_str(name);
            schema.push('\u{1f}');
        }
        let schema: String = schema.chars().take(SCHEMA_PREFIX_CHARS).collect();
        Self::Set {
            record_count: records.len(),
            schema_digest: schema_digest(&schema),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Stable 64-bit digest of the sampled schema prefix.
#[must_use]
fn schema_digest(schema: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(schema.as_bytes());
    let digest = hasher.finalize();
    u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

/// Short-circuits recomputation when the input set has not meaningfully
/// changed since the last accepted run.
#[derive(Debug, Default)]
pub struct FingerprintGate {
    last: Option<RunFingerprint>,
}

impl FingerprintGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a run should execute for `records`, recording the new
    /// fingerprint immediately (before any run completes) so a re-entrant
    /// trigger with the same input is declined.
    pub fn should_run(&mut self, records: &[Record]) -> bool {
        self.should_run_fingerprint(RunFingerprint::compute(records))
    }

    pub fn should_run_fingerprint(&mut self, fingerprint: RunFingerprint) -> bool {
        if !fingerprint.is_empty() && self.last.as_ref() == Some(&fingerprint) {
            return false;
        }
        self.last = Some(fingerprint);
        true
    }

    /// Forgets the recorded fingerprint so the next trigger runs even if its
    /// input matches. Used when a run's result is discarded: the recorded
    /// fingerprint no longer describes anything that was actually published.
    pub fn reset(&mut self) {
        self.last = None;
    }

    #[must_use]
    pub fn last(&self) -> Option<&RunFingerprint> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(count: usize, fields: &[&str]) -> Vec<Record> {
        (0..count)
            .map(|idx| {
                fields
                    .iter()
                    .map(|name| ((*name).to_string(), json!(format!("value {idx}"))))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn unchanged_input_is_declined_on_second_trigger() {
        let mut gate = FingerprintGate::new();
        let set = records(5, &["title", "body"]);
        assert!(gate.should_run(&set));
        assert!(!gate.should_run(&set));
    }

    #[test]
    fn count_change_triggers_a_run() {
        let mut gate = FingerprintGate::new();
        assert!(gate.should_run(&records(5, &["title", "body"])));
        assert!(gate.should_run(&records(6, &["title", "body"])));
    }

    #[test]
    fn schema_change_triggers_a_run() {
        let mut gate = FingerprintGate::new();
        assert!(gate.should_run(&records(5, &["title", "body"])));
        assert!(gate.should_run(&records(5, &["title", "summary"])));
    }

    #[test]
    fn empty_input_always_runs() {
        let mut gate = FingerprintGate::new();
        assert!(gate.should_run(&[]));
        assert!(gate.should_run(&[]));
        assert!(RunFingerprint::compute(&[]).is_empty());
    }

    #[test]
    fn fingerprint_is_recorded_before_any_run_completes() {
        let mut gate = FingerprintGate::new();
        let set = records(3, &["body"]);
        assert!(gate.should_run(&set));
        assert_eq!(gate.last(), Some(&RunFingerprint::compute(&set)));
    }

    #[test]
    fn reset_forgets_the_recorded_fingerprint() {
        let mut gate = FingerprintGate::new();
        let set = records(5, &["title", "body"]);
        assert!(gate.should_run(&set));
        assert!(!gate.should_run(&set));
        gate.reset();
        assert!(gate.should_run(&set));
    }

    #[test]
    fn schema_prefix_is_bounded() {
        // The digest only sees a bounded prefix of the field-name sample, so
        // a schema difference past the boundary does not alter it.
        let long_name = "field".repeat(100);
        let a = records(2, &[long_name.as_str(), "tail"]);
        let b = records(2, &[long_name.as_str(), "other"]);
        assert_eq!(RunFingerprint::compute(&a), RunFingerprint::compute(&b));
    }
}
