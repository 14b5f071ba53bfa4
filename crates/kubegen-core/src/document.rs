//! Checked access to generic documents
//!
//! A generic document is a [`serde_yaml::Value`] tree. The helpers here walk
//! it by key, treat a missing key and an explicit `null` alike, and report a
//! [`ShapeError`] when a value has a different type than the path expects.
//! Removal keeps the order of the remaining keys.

use serde_yaml::{Mapping, Sequence, Value};

pub type ShapeResult<T> = std::result::Result<T, ShapeError>;

/// A value at `path` has an unexpected type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: expected {expected}, found {found}")]
pub struct ShapeError {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl ShapeError {
    pub fn new(path: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self {
            path: path.into(),
            expected,
            found,
        }
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Append `key` to a dotted path.
pub fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn mismatch(path: &str, key: &str, expected: &'static str, found: &Value) -> ShapeError {
    ShapeError::new(join(path, key), expected, type_name(found))
}

/// The mapping under `key`, or `None` if the key is absent or null.
pub fn mapping_mut<'a>(
    map: &'a mut Mapping,
    key: &str,
    path: &str,
) -> ShapeResult<Option<&'a mut Mapping>> {
    match map.get_mut(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(inner)) => Ok(Some(inner)),
        Some(other) => Err(mismatch(path, key, "mapping", other)),
    }
}

/// The sequence under `key`, or `None` if the key is absent or null.
pub fn sequence_mut<'a>(
    map: &'a mut Mapping,
    key: &str,
    path: &str,
) -> ShapeResult<Option<&'a mut Sequence>> {
    match map.get_mut(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(inner)) => Ok(Some(inner)),
        Some(other) => Err(mismatch(path, key, "sequence", other)),
    }
}

/// Remove `key` if its value is an explicit null.
pub fn delete_if_null(map: &mut Mapping, key: &str) -> bool {
    if map.get(key).is_some_and(Value::is_null) {
        map.shift_remove(key);
        true
    } else {
        false
    }
}

/// Remove `key` if its value is an empty mapping. Non-empty mappings and
/// nulls are kept; any other type is a shape error.
pub fn delete_if_empty_mapping(map: &mut Mapping, key: &str, path: &str) -> ShapeResult<bool> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Mapping(inner)) if inner.is_empty() => {
            map.shift_remove(key);
            Ok(true)
        }
        Some(Value::Mapping(_)) => Ok(false),
        Some(other) => Err(mismatch(path, key, "mapping", other)),
    }
}

/// Remove `outer.inner` if it is null, then `outer` if that left it empty.
pub fn delete_nested_if_null(
    map: &mut Mapping,
    outer: &str,
    inner: &str,
    path: &str,
) -> ShapeResult<()> {
    if let Some(nested) = mapping_mut(map, outer, path)? {
        if !nested.is_empty() {
            delete_if_null(nested, inner);
        }
    }
    delete_if_empty_mapping(map, outer, path)?;
    Ok(())
}

/// Remove `outer.inner` if it is an empty mapping, then `outer` if that left
/// it empty.
pub fn delete_nested_if_empty_mapping(
    map: &mut Mapping,
    outer: &str,
    inner: &str,
    path: &str,
) -> ShapeResult<()> {
    if let Some(nested) = mapping_mut(map, outer, path)? {
        if !nested.is_empty() {
            delete_if_empty_mapping(nested, inner, &join(path, outer))?;
        }
    }
    delete_if_empty_mapping(map, outer, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapping(source: &str) -> Mapping {
        serde_yaml::from_str(source).unwrap()
    }

    #[test]
    fn test_delete_if_null_only_removes_null() {
        let mut map = mapping("a: null\nb: 0\nc: ''\n");
        assert!(delete_if_null(&mut map, "a"));
        assert!(!delete_if_null(&mut map, "b"));
        assert!(!delete_if_null(&mut map, "c"));
        assert!(!delete_if_null(&mut map, "missing"));
        assert_eq!(map, mapping("b: 0\nc: ''\n"));
    }

    #[test]
    fn test_delete_if_empty_mapping_keeps_other_values() {
        let mut map = mapping("a: {}\nb: {x: 1}\nc: null\n");
        assert!(delete_if_empty_mapping(&mut map, "a", "").unwrap());
        assert!(!delete_if_empty_mapping(&mut map, "b", "").unwrap());
        assert!(!delete_if_empty_mapping(&mut map, "c", "").unwrap());
        assert_eq!(map, mapping("b: {x: 1}\nc: null\n"));
    }

    #[test]
    fn test_delete_if_empty_mapping_rejects_sequences() {
        let mut map = mapping("a: []\n");
        let err = delete_if_empty_mapping(&mut map, "a", "items[0]").unwrap_err();
        assert_eq!(err.to_string(), "items[0].a: expected mapping, found sequence");
        assert_eq!(map, mapping("a: []\n"));
    }

    #[test]
    fn test_nested_delete_cascades_to_parent() {
        let mut map = mapping("metadata:\n  creationTimestamp: null\nkind: Service\n");
        delete_nested_if_null(&mut map, "metadata", "creationTimestamp", "").unwrap();
        assert_eq!(map, mapping("kind: Service\n"));
    }

    #[test]
    fn test_nested_delete_keeps_populated_parent() {
        let mut map = mapping("status:\n  loadBalancer: {}\n  replicas: 2\n");
        delete_nested_if_empty_mapping(&mut map, "status", "loadBalancer", "").unwrap();
        assert_eq!(map, mapping("status:\n  replicas: 2\n"));
    }

    #[test]
    fn test_removal_preserves_key_order() {
        let mut map = mapping("a: 1\nb: null\nc: 2\nd: 3\n");
        delete_if_null(&mut map, "b");
        let keys: Vec<_> = map.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["a", "c", "d"]);
    }

    #[test]
    fn test_mapping_mut_reports_path() {
        let mut map = mapping("spec: 3\n");
        let err = mapping_mut(&mut map, "spec", "items[1]").unwrap_err();
        assert_eq!(err.path, "items[1].spec");
        assert_eq!(err.found, "number");
    }
}
