//! Helpers for serializing/deserializing SurrealDB record ids.

use serde::{Deserialize, Deserializer, Serializer};

/// Record ids come back from SurrealDB as a `Thing` object (`{tb, id}`)
/// while we store and expose them as bare strings. This module accepts
/// either form and always yields the bare id.
pub mod thing_id {
    use super::*;

    pub fn serialize<S>(id: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum IdValue {
            String(String),
            Thing { id: serde_json::Value },
        }

        match IdValue::deserialize(deserializer)? {
            IdValue::String(s) => Ok(strip_table_prefix(&s)),
            IdValue::Thing { id } => match id {
                serde_json::Value::String(s) => Ok(s),
                serde_json::Value::Number(n) => Ok(n.to_string()),
                serde_json::Value::Object(obj) => match obj.get("String") {
                    Some(serde_json::Value::String(s)) => Ok(s.clone()),
                    _ => Ok(serde_json::Value::Object(obj).to_string()),
                },
                other => Ok(other.to_string()),
            },
        }
    }

    fn strip_table_prefix(raw: &str) -> String {
        match raw.split_once(':') {
            Some((_, id)) => id.trim_matches(|c| c == '⟨' || c == '⟩').to_string(),
            None => raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Record {
        #[serde(with = "super::thing_id")]
        id: String,
    }

    #[test]
    fn accepts_bare_string_ids() {
        let rec: Record = serde_json::from_value(serde_json::json!({"id": "abc-123"})).unwrap();
        assert_eq!(rec.id, "abc-123");
    }

    #[test]
    fn strips_table_prefix_from_string_ids() {
        let rec: Record =
            serde_json::from_value(serde_json::json!({"id": "comment:⟨abc-123⟩"})).unwrap();
        assert_eq!(rec.id, "abc-123");
    }

    #[test]
    fn unwraps_thing_objects() {
        let rec: Record =
            serde_json::from_value(serde_json::json!({"id": {"tb": "comment", "id": "abc-123"}}))
                .unwrap();
        assert_eq!(rec.id, "abc-123");
    }
}
