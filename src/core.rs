//! # Core
//!
//! Serde helpers shared by the document model.

use serde::{Deserialize, Serialize};

/// `Kind` allows serde to serialize/deserialize a string or an object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

/// `OneMany` allows serde to serialize/deserialize a single object or a set of
/// objects.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneMany<T> {
    /// Single object
    One(T),

    /// Set of objects
    Many(Vec<T>),
}

impl From<&str> for OneMany<String> {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn one_or_many() {
        let one: OneMany<String> = serde_json::from_value(json!("a")).expect("should parse");
        assert_eq!(one, OneMany::from("a"));

        let many: OneMany<String> =
            serde_json::from_value(json!(["a", "b"])).expect("should parse");
        assert_eq!(many, OneMany::Many(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(serde_json::to_value(&many).expect("should serialize"), json!(["a", "b"]));
    }

    #[test]
    fn string_or_object() {
        let kind: Kind<serde_json::Value> =
            serde_json::from_value(json!("did:ex:123#key-1")).expect("should parse");
        assert_eq!(kind, Kind::String("did:ex:123#key-1".to_string()));

        let kind: Kind<serde_json::Value> =
            serde_json::from_value(json!({"id": "key-1"})).expect("should parse");
        assert_eq!(kind, Kind::Object(json!({"id": "key-1"})));
    }
}
