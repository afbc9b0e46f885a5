use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One retrieved record: an ordered mapping from field name to a JSON scalar.
///
/// Field sets are not uniform across records; any record may carry a different
/// key set than its neighbours. Iteration order is insertion order (serde_json
/// `preserve_order`), which is what "first-encountered field" means everywhere
/// downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Coerces the named field to text. Only scalars carry text: strings are
    /// taken as-is, numbers and booleans via their display form. Null, missing
    /// and non-scalar values yield `None`.
    #[must_use]
    pub fn scalar_text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Text length (in chars) of the named field under the same coercion as
    /// [`scalar_text`](Self::scalar_text), without allocating for strings.
    /// Missing, null and non-scalar values count as 0.
    #[must_use]
    pub fn text_len(&self, field: &str) -> usize {
        match self.fields.get(field) {
            Some(Value::String(s)) => s.chars().count(),
            Some(Value::Number(n)) => n.to_string().len(),
            Some(Value::Bool(b)) => b.to_string().len(),
            _ => 0,
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// One entry of the published word cloud: a normalized token and its final
/// count across all successful batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FrequencyEntry {
    pub text: String,
    pub value: u64,
}

impl FrequencyEntry {
    #[must_use]
    pub fn new(text: impl Into<String>, value: u64) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }
}
