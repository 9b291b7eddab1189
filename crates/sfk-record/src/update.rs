//! Partial updates over stored documents
//!
//! The remote store applies updates at field granularity: each
//! `(FieldPath, UpdateValue)` pair replaces exactly one field,
//! last-write-wins. Intermediate objects are created as needed so a dotted
//! path can land in a document that predates the field.

use crate::path::FieldPath;
use serde_json::Value;

/// Value side of a partial update
///
/// Either a concrete JSON value or one of the two store sentinels the
/// original contract supports: "set to server time" and "append to array".
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateValue {
    /// Store this value verbatim
    Set(Value),
    /// Resolve to the store's clock at apply time (epoch milliseconds)
    ServerTimestamp,
    /// Append these elements to the addressed array, skipping duplicates
    ArrayUnion(Vec<Value>),
}

impl UpdateValue {
    /// Convenience for `Set(json!(..))`-style call sites
    #[inline]
    pub fn set(value: impl Into<Value>) -> Self {
        UpdateValue::Set(value.into())
    }
}

/// Errors applying a partial update
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError {
    /// A path segment addressed through a non-object value
    #[error("field path {path:?} traverses a non-object value at {segment:?}")]
    NotAnObject { path: String, segment: String },

    /// ArrayUnion addressed a non-array, non-null field
    #[error("array union target {0:?} is not an array")]
    NotAnArray(String),

    /// Document root is not an object
    #[error("document root is not an object")]
    RootNotAnObject,

    /// Path with no segments
    #[error("empty field path")]
    EmptyPath,
}

/// Apply one partial update to a document in place
///
/// `server_time_ms` is the store clock reading used to resolve the
/// [`UpdateValue::ServerTimestamp`] sentinel.
pub fn apply_update(
    doc: &mut Value,
    path: &FieldPath,
    value: &UpdateValue,
    server_time_ms: i64,
) -> Result<(), UpdateError> {
    let (leaf, parents) = path
        .segments()
        .split_last()
        .ok_or(UpdateError::EmptyPath)?;

    let mut current = match doc {
        Value::Object(_) => doc,
        _ => return Err(UpdateError::RootNotAnObject),
    };

    for segment in parents {
        let map = current
            .as_object_mut()
            .ok_or_else(|| UpdateError::NotAnObject {
                path: path.to_string(),
                segment: segment.clone(),
            })?;
        let entry = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if entry.is_null() {
            // A skeleton null is a legal parent; promote it to an object.
            *entry = Value::Object(serde_json::Map::new());
        }
        if !entry.is_object() {
            return Err(UpdateError::NotAnObject {
                path: path.to_string(),
                segment: segment.clone(),
            });
        }
        current = entry;
    }

    let map = current
        .as_object_mut()
        .ok_or_else(|| UpdateError::NotAnObject {
            path: path.to_string(),
            segment: leaf.clone(),
        })?;

    match value {
        UpdateValue::Set(v) => {
            map.insert(leaf.clone(), v.clone());
        }
        UpdateValue::ServerTimestamp => {
            map.insert(leaf.clone(), Value::from(server_time_ms));
        }
        UpdateValue::ArrayUnion(elements) => {
            let slot = map.entry(leaf.clone()).or_insert(Value::Array(Vec::new()));
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            let array = slot
                .as_array_mut()
                .ok_or_else(|| UpdateError::NotAnArray(path.to_string()))?;
            for element in elements {
                if !array.contains(element) {
                    array.push(element.clone());
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn path(s: &str) -> FieldPath {
        FieldPath::from_str(s).unwrap()
    }

    #[test]
    fn sets_nested_field_creating_parents() {
        let mut doc = json!({});
        apply_update(
            &mut doc,
            &path("mainStudy.observer_timeouts.stage_2"),
            &UpdateValue::set(1234),
            0,
        )
        .unwrap();
        assert_eq!(doc["mainStudy"]["observer_timeouts"]["stage_2"], json!(1234));
    }

    #[test]
    fn server_timestamp_resolves_to_clock() {
        let mut doc = json!({ "consentTimestamp": null });
        apply_update(
            &mut doc,
            &path("consentTimestamp"),
            &UpdateValue::ServerTimestamp,
            1_700_000_000_000,
        )
        .unwrap();
        assert_eq!(doc["consentTimestamp"], json!(1_700_000_000_000i64));
    }

    #[test]
    fn array_union_deduplicates() {
        let mut doc = json!({ "tags": ["a"] });
        apply_update(
            &mut doc,
            &path("tags"),
            &UpdateValue::ArrayUnion(vec![json!("a"), json!("b")]),
            0,
        )
        .unwrap();
        assert_eq!(doc["tags"], json!(["a", "b"]));
    }

    #[test]
    fn array_union_promotes_null_and_missing() {
        let mut doc = json!({ "existing": null });
        apply_update(
            &mut doc,
            &path("existing"),
            &UpdateValue::ArrayUnion(vec![json!(1)]),
            0,
        )
        .unwrap();
        apply_update(
            &mut doc,
            &path("fresh"),
            &UpdateValue::ArrayUnion(vec![json!(2)]),
            0,
        )
        .unwrap();
        assert_eq!(doc["existing"], json!([1]));
        assert_eq!(doc["fresh"], json!([2]));
    }

    #[test]
    fn rejects_traversal_through_scalars() {
        let mut doc = json!({ "consentGiven": false });
        let err = apply_update(
            &mut doc,
            &path("consentGiven.inner"),
            &UpdateValue::set(true),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, UpdateError::NotAnObject { .. }));
    }

    #[test]
    fn null_parent_is_promoted_to_object() {
        let mut doc = json!({ "studyCompensation": null });
        apply_update(
            &mut doc,
            &path("studyCompensation.matriculationNumber"),
            &UpdateValue::set("123456"),
            0,
        )
        .unwrap();
        assert_eq!(
            doc["studyCompensation"]["matriculationNumber"],
            json!("123456")
        );
    }

    #[test]
    fn updates_are_last_write_wins_per_field() {
        let mut doc = json!({ "lastStage": "consent", "studyStatus": "in_progress" });
        apply_update(&mut doc, &path("lastStage"), &UpdateValue::set("study"), 0).unwrap();
        apply_update(&mut doc, &path("lastStage"), &UpdateValue::set("finish"), 0).unwrap();
        assert_eq!(doc["lastStage"], json!("finish"));
        // Disjoint fields compose.
        assert_eq!(doc["studyStatus"], json!("in_progress"));
    }
}
