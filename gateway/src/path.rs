//! Dotted-path traversal over arbitrary JSON records.
//!
//! Page responses are schema-agnostic: where the entity collection and the
//! next-page cursor live is decided by configuration (`ENTITIES_PATH`,
//! `NEXT_PAGE`), expressed as dotted paths like `d.results`.

use serde_json::Value;

/// Navigates `value` field-by-field along a dotted path.
///
/// A path matching a literal top-level key wins over dotted traversal, so
/// selectors like `@odata.nextLink` (a single key containing a dot) resolve
/// correctly. Returns `None` as soon as a segment is absent or the current
/// value is not an object, rather than failing.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(direct) = value.as_object()?.get(path) {
        return Some(direct);
    }
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Extracts the identifier of a group-like entity.
///
/// The identifier is the value of the first key whose name, split on the `:`
/// namespace separator, has `id` as its last segment. Entities with no such
/// key (or a non-string value there) yield `None`; callers treat that as a
/// per-entity not-found instead of failing the whole batch.
pub fn entity_id(entity: &Value) -> Option<&str> {
    let object = entity.as_object()?;
    for (key, value) in object {
        if key.rsplit(':').next() == Some("id") {
            return value.as_str();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_single_segment() {
        let value = json!({"value": [1, 2, 3]});
        assert_eq!(lookup(&value, "value"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_lookup_nested() {
        let value = json!({"d": {"results": {"items": "x"}}});
        assert_eq!(lookup(&value, "d.results.items"), Some(&json!("x")));
    }

    #[test]
    fn test_lookup_missing_segment() {
        let value = json!({"d": {"results": []}});
        assert!(lookup(&value, "d.other").is_none());
        assert!(lookup(&value, "d.results.deeper").is_none());
    }

    #[test]
    fn test_lookup_literal_key_containing_dot() {
        let value = json!({"@odata.nextLink": "https://example.com/next"});
        assert_eq!(
            lookup(&value, "@odata.nextLink"),
            Some(&json!("https://example.com/next"))
        );
    }

    #[test]
    fn test_lookup_literal_key_wins_over_traversal() {
        let value = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(lookup(&value, "a.b"), Some(&json!(1)));
    }

    #[test]
    fn test_entity_id_plain_key() {
        let entity = json!({"id": "group-1", "name": "x"});
        assert_eq!(entity_id(&entity), Some("group-1"));
    }

    #[test]
    fn test_entity_id_namespaced_key() {
        let entity = json!({"ns:id": "group-2"});
        assert_eq!(entity_id(&entity), Some("group-2"));
    }

    #[test]
    fn test_entity_id_absent() {
        let entity = json!({"name": "x", "identifier": "y"});
        assert!(entity_id(&entity).is_none());
    }

    #[test]
    fn test_entity_id_non_string_value() {
        let entity = json!({"id": 42});
        assert!(entity_id(&entity).is_none());
    }
}
