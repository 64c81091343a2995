//! Request body assembly.
//!
//! An automation request body is a small set of top-level fields
//! (`input`, `context`, `params`) whose values are either scalars or
//! nested sub-key maps, built incrementally before being serialized once
//! at send time.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::blob::Blob;

/// The value of one top-level body field.
///
/// Each field tracks its own flat-or-nested shape: setting a sub-key on
/// one field never reshapes the others, and a sub-key set on a field that
/// currently holds a scalar replaces that scalar with a one-entry map.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue {
    /// A flat scalar value (string, number, bool, ...).
    Scalar(Value),
    /// A nested sub-key map.
    Nested(Map<String, Value>),
}

/// Incrementally built request body plus its attached blobs.
///
/// Blobs are held outside the JSON map; when any are present the request
/// is dispatched as multipart and the JSON part carries only the
/// non-blob fields.
#[derive(Debug, Clone, Default)]
pub struct RequestBody {
    fields: BTreeMap<String, BodyValue>,
    blobs: Vec<Blob>,
    schema_filter: Option<String>,
    void_operation: Option<String>,
}

impl RequestBody {
    /// Create an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a flat scalar value, overwriting any previous
    /// value (scalar or nested) for that field.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields
            .insert(field.into(), BodyValue::Scalar(value.into()));
        self
    }

    /// Set a sub-key under a field, promoting that field to a nested map
    /// if it is not one already. Repeated sets of the same sub-key
    /// overwrite in place.
    pub fn set_nested(
        &mut self,
        field: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        let entry = self
            .fields
            .entry(field.into())
            .or_insert_with(|| BodyValue::Nested(Map::new()));
        if let BodyValue::Scalar(_) = entry {
            *entry = BodyValue::Nested(Map::new());
        }
        if let BodyValue::Nested(map) = entry {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Current value of a field, if set.
    pub fn get(&self, field: &str) -> Option<&BodyValue> {
        self.fields.get(field)
    }

    /// Append a blob attachment, keeping insertion order.
    pub fn attach_blob(&mut self, blob: Blob) -> &mut Self {
        self.blobs.push(blob);
        self
    }

    /// The attached blobs, in insertion order.
    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    /// Whether any blob is attached (multipart dispatch).
    pub fn has_blobs(&self) -> bool {
        !self.blobs.is_empty()
    }

    /// Record the document-properties schema filter header value.
    /// Only one value is active; repeated calls overwrite.
    pub fn set_schema_filter(&mut self, schema: impl Into<String>) -> &mut Self {
        self.schema_filter = Some(schema.into());
        self
    }

    /// The active schema filter, if any.
    pub fn schema_filter(&self) -> Option<&str> {
        self.schema_filter.as_deref()
    }

    /// Record the void-operation header token ("*", "true", ...).
    pub fn set_void_operation(&mut self, token: impl Into<String>) -> &mut Self {
        self.void_operation = Some(token.into());
        self
    }

    /// The void-operation header token, if set.
    pub fn void_operation(&self) -> Option<&str> {
        self.void_operation.as_deref()
    }

    /// Serialize the non-blob fields to a JSON object.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (field, value) in &self.fields {
            let json = match value {
                BodyValue::Scalar(v) => v.clone(),
                BodyValue::Nested(m) => Value::Object(m.clone()),
            };
            map.insert(field.clone(), json);
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_set() {
        let mut body = RequestBody::new();
        body.set("input", "/default-domain/workspaces");
        assert_eq!(body.to_json(), json!({"input": "/default-domain/workspaces"}));
    }

    #[test]
    fn test_nested_sets_accumulate_per_field() {
        let mut body = RequestBody::new();
        body.set_nested("context", "path", "/a/b")
            .set_nested("context", "other", "value");
        assert_eq!(
            body.to_json(),
            json!({"context": {"path": "/a/b", "other": "value"}})
        );
    }

    #[test]
    fn test_nested_set_does_not_reshape_other_fields() {
        let mut body = RequestBody::new();
        body.set("input", "doc:/some/doc");
        body.set_nested("params", "value", "title");
        assert_eq!(
            body.to_json(),
            json!({"input": "doc:/some/doc", "params": {"value": "title"}})
        );
    }

    #[test]
    fn test_repeated_set_overwrites_in_place() {
        let mut body = RequestBody::new();
        body.set("input", "first").set("input", "second");
        assert_eq!(body.to_json(), json!({"input": "second"}));

        body.set_nested("params", "query", "a").set_nested("params", "query", "b");
        assert_eq!(body.to_json()["params"]["query"], json!("b"));
    }

    #[test]
    fn test_nested_after_flat_replaces_scalar_with_map() {
        let mut body = RequestBody::new();
        body.set("context", "plain");
        body.set_nested("context", "path", "/a/b");
        assert_eq!(body.to_json(), json!({"context": {"path": "/a/b"}}));
    }

    #[test]
    fn test_forward_slashes_stay_literal_in_serialized_json() {
        let mut body = RequestBody::new();
        body.set_nested("context", "path", "/default-domain/workspaces/x");
        let serialized = serde_json::to_string(&body.to_json()).unwrap();
        assert!(serialized.contains("/default-domain/workspaces/x"));
        assert!(!serialized.contains("\\/"));
    }

    #[test]
    fn test_blob_list_keeps_insertion_order() {
        let mut body = RequestBody::new();
        body.attach_blob(Blob::from_bytes("a.png", "image/png", vec![1]))
            .attach_blob(Blob::from_bytes("b.png", "image/png", vec![2]));
        assert!(body.has_blobs());
        let names: Vec<_> = body.blobs().iter().map(|b| b.filename()).collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }

    #[test]
    fn test_header_directives_do_not_touch_fields() {
        let mut body = RequestBody::new();
        body.set_schema_filter("dublincore").set_void_operation("*");
        assert_eq!(body.to_json(), json!({}));
        assert_eq!(body.schema_filter(), Some("dublincore"));
        assert_eq!(body.void_operation(), Some("*"));
    }
}
