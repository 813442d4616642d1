//! Accumulated answers keyed by step id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Answers collected during one flow, serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseMap(HashMap<String, String>);

impl ResponseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the answer for `step_id`.
    pub fn upsert(&mut self, step_id: impl Into<String>, answer: impl Into<String>) {
        self.0.insert(step_id.into(), answer.into());
    }

    pub fn get(&self, step_id: &str) -> Option<&str> {
        self.0.get(step_id).map(String::as_str)
    }

    /// Whether `step_id` has an answer that is non-empty once trimmed.
    pub fn has_answer(&self, step_id: &str) -> bool {
        self.get(step_id).is_some_and(|a| !a.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for ResponseMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_existing_answer() {
        let mut responses = ResponseMap::new();
        responses.upsert("q1", "first");
        responses.upsert("q1", "second");
        assert_eq!(responses.len(), 1);
        assert_eq!(responses.get("q1"), Some("second"));
    }

    #[test]
    fn whitespace_answer_is_not_an_answer() {
        let responses: ResponseMap = [("q1", "   ")].into_iter().collect();
        assert!(!responses.has_answer("q1"));
        assert!(!responses.has_answer("q2"));
    }

    #[test]
    fn serializes_as_flat_object() {
        let responses: ResponseMap = [("q1", "Often")].into_iter().collect();
        let json = serde_json::to_value(&responses).unwrap();
        assert_eq!(json, serde_json::json!({ "q1": "Often" }));
    }
}
