//! Request fingerprints
//!
//! A fingerprint is the endpoint followed by the JSON of its parameters.
//! Parameters live in an ordered map, so the same logical request always
//! produces the same fingerprint no matter the order it was built in.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Query parameters of one outbound request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the parameters as URL query pairs.
    ///
    /// Strings go out unquoted, other scalars in their JSON form, nulls are skipped.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), rendered)
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Cache key for `endpoint` called with `params`.
pub fn fingerprint(endpoint: &str, params: &QueryParams) -> String {
    let serialized = serde_json::to_string(params).unwrap_or_else(|_| String::from("{}"));
    format!("{}{}", endpoint, serialized)
}
