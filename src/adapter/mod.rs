//! Generic bidirectional translation between the canonical tree model and a
//! backing store's native document representation.
//!
//! The codec never touches a concrete format: it speaks only to the
//! [DocumentAdapter] capability trait, implemented once per backing format.
//! [TreeAdapter] is the implementation for the native [Document] tree used by
//! the bundled backends.

use crate::common::{Document, Value};
use crate::dsl::Expression;
use crate::errors::{CatalogError, CatalogResult, ErrorKind};

/// Typed, shape-checked access to an abstract document node.
///
/// All `read_*` accessors return `Ok(None)` when the named field is absent
/// and fail with [ErrorKind::MalformedMetadata], carrying the offending field
/// name, when the field is present but has the wrong shape. Callers never
/// pre-validate shapes.
pub trait DocumentAdapter {
    /// The backing format's document node type.
    type Node;

    fn read_string(&self, node: &Self::Node, name: &str) -> CatalogResult<Option<String>>;

    fn read_object(&self, node: &Self::Node, name: &str) -> CatalogResult<Option<Self::Node>>;

    /// Reads a scalar field (string, number, boolean, or date).
    fn read_scalar(&self, node: &Self::Node, name: &str) -> CatalogResult<Option<Value>>;

    fn read_string_list(&self, node: &Self::Node, name: &str)
        -> CatalogResult<Option<Vec<String>>>;

    fn read_object_list(
        &self,
        node: &Self::Node,
        name: &str,
    ) -> CatalogResult<Option<Vec<Self::Node>>>;

    fn new_node(&self) -> Self::Node;

    /// Creates an empty array field on the node.
    fn new_array(&self, node: &mut Self::Node, name: &str) -> CatalogResult<()>;

    fn put_string(&self, node: &mut Self::Node, name: &str, value: &str) -> CatalogResult<()>;

    fn put_scalar(&self, node: &mut Self::Node, name: &str, value: Value) -> CatalogResult<()>;

    fn put_object(&self, node: &mut Self::Node, name: &str, child: Self::Node)
        -> CatalogResult<()>;

    fn append_string(&self, node: &mut Self::Node, array: &str, value: &str) -> CatalogResult<()>;

    fn append_object(
        &self,
        node: &mut Self::Node,
        array: &str,
        child: Self::Node,
    ) -> CatalogResult<()>;

    /// Reads a field of any shape as a canonical [Value]. Used to carry
    /// unknown/custom fields through a parse-then-convert round trip without
    /// interpreting them.
    fn read_value(&self, node: &Self::Node, name: &str) -> CatalogResult<Option<Value>>;

    /// Writes a canonical [Value] of any shape.
    fn put_value(&self, node: &mut Self::Node, name: &str, value: Value) -> CatalogResult<()>;

    /// Returns the keys present on `node` other than those in `excluded`,
    /// in document order. Used to detect unknown/custom fields during parsing.
    fn fields_not_in(&self, node: &Self::Node, excluded: &[&str]) -> Vec<String>;

    /// Embeds an opaque DSL expression as a nested sub-document.
    fn put_expression(
        &self,
        node: &mut Self::Node,
        name: &str,
        expr: &Expression,
    ) -> CatalogResult<()>;

    /// Extracts an embedded DSL expression, mediated by the textual
    /// interchange form: the sub-document is re-serialized to text and
    /// re-parsed through the expression parser, so the grammar has one code
    /// path regardless of the storage format.
    fn read_expression(&self, node: &Self::Node, name: &str)
        -> CatalogResult<Option<Expression>>;
}

/// [DocumentAdapter] implementation for the native [Document] tree.
#[derive(Clone, Debug, Default)]
pub struct TreeAdapter;

impl TreeAdapter {
    pub fn new() -> Self {
        TreeAdapter
    }
}

fn malformed(name: &str) -> CatalogError {
    CatalogError::new(name, ErrorKind::MalformedMetadata)
}

impl DocumentAdapter for TreeAdapter {
    type Node = Document;

    fn read_string(&self, node: &Document, name: &str) -> CatalogResult<Option<String>> {
        match node.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(malformed(name)),
        }
    }

    fn read_object(&self, node: &Document, name: &str) -> CatalogResult<Option<Document>> {
        match node.get(name) {
            None => Ok(None),
            Some(Value::Document(d)) => Ok(Some(d.clone())),
            Some(_) => Err(malformed(name)),
        }
    }

    fn read_scalar(&self, node: &Document, name: &str) -> CatalogResult<Option<Value>> {
        match node.get(name) {
            None => Ok(None),
            Some(v) if v.is_scalar() => Ok(Some(v.clone())),
            Some(_) => Err(malformed(name)),
        }
    }

    fn read_string_list(&self, node: &Document, name: &str) -> CatalogResult<Option<Vec<String>>> {
        match node.get(name) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(s) => out.push(s.to_string()),
                        None => return Err(malformed(name)),
                    }
                }
                Ok(Some(out))
            }
            Some(_) => Err(malformed(name)),
        }
    }

    fn read_object_list(&self, node: &Document, name: &str) -> CatalogResult<Option<Vec<Document>>> {
        match node.get(name) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_document() {
                        Some(d) => out.push(d.clone()),
                        None => return Err(malformed(name)),
                    }
                }
                Ok(Some(out))
            }
            Some(_) => Err(malformed(name)),
        }
    }

    fn new_node(&self) -> Document {
        Document::new()
    }

    fn new_array(&self, node: &mut Document, name: &str) -> CatalogResult<()> {
        node.put(name, Value::Array(Vec::new()))
    }

    fn put_string(&self, node: &mut Document, name: &str, value: &str) -> CatalogResult<()> {
        node.put(name, value)
    }

    fn put_scalar(&self, node: &mut Document, name: &str, value: Value) -> CatalogResult<()> {
        node.put(name, value)
    }

    fn put_object(&self, node: &mut Document, name: &str, child: Document) -> CatalogResult<()> {
        node.put(name, child)
    }

    fn append_string(&self, node: &mut Document, array: &str, value: &str) -> CatalogResult<()> {
        self.append(node, array, Value::String(value.to_string()))
    }

    fn append_object(&self, node: &mut Document, array: &str, child: Document) -> CatalogResult<()> {
        self.append(node, array, Value::Document(child))
    }

    fn read_value(&self, node: &Document, name: &str) -> CatalogResult<Option<Value>> {
        Ok(node.get(name).cloned())
    }

    fn put_value(&self, node: &mut Document, name: &str, value: Value) -> CatalogResult<()> {
        node.put(name, value)
    }

    fn fields_not_in(&self, node: &Document, excluded: &[&str]) -> Vec<String> {
        node.keys()
            .filter(|key| !excluded.contains(&key.as_str()))
            .cloned()
            .collect()
    }

    fn put_expression(
        &self,
        node: &mut Document,
        name: &str,
        expr: &Expression,
    ) -> CatalogResult<()> {
        let interchange = expr.to_interchange()?;
        node.put(name, interchange_to_value(&interchange))
    }

    fn read_expression(&self, node: &Document, name: &str) -> CatalogResult<Option<Expression>> {
        let embedded = match node.get(name) {
            None => return Ok(None),
            Some(v @ Value::Document(_)) | Some(v @ Value::Array(_)) => v,
            Some(_) => return Err(malformed(name)),
        };
        let interchange = value_to_interchange(embedded).map_err(|e| {
            CatalogError::new_with_cause(name, ErrorKind::MalformedMetadata, e)
        })?;
        let text = serde_json::to_string(&interchange)?;
        Ok(Some(Expression::from_text(&text)?))
    }
}

impl TreeAdapter {
    fn append(&self, node: &mut Document, array: &str, value: Value) -> CatalogResult<()> {
        let mut items = match node.remove(array) {
            None => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                // put the field back before failing
                node.put(array, other)?;
                return Err(malformed(array));
            }
        };
        items.push(value);
        node.put(array, Value::Array(items))
    }
}

/// Converts an interchange tree to a canonical [Value], normalizing numeric
/// leaves by category: anything that fits an `i64` collapses to [Value::I64],
/// anything a double represents losslessly collapses to [Value::F64], and
/// everything else (arbitrary-precision decimals and integers) passes through
/// as [Value::Decimal] without precision loss.
pub(crate) fn interchange_to_value(node: &serde_json::Value) -> Value {
    match node {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => number_to_value(n),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            Value::Array(items.iter().map(interchange_to_value).collect())
        }
        serde_json::Value::Object(entries) => {
            let mut doc = Document::new();
            for (key, value) in entries {
                // interchange keys are never empty, so put cannot fail here
                let _ = doc.put(key, interchange_to_value(value));
            }
            Value::Document(doc)
        }
    }
}

fn number_to_value(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::I64(i);
    }
    if let Some(f) = n.as_f64() {
        if let Some(roundtrip) = serde_json::Number::from_f64(f) {
            if roundtrip.to_string() == n.to_string() {
                return Value::F64(f);
            }
        }
    }
    Value::Decimal(n.to_string())
}

/// Converts a canonical [Value] back to the interchange tree.
pub(crate) fn value_to_interchange(value: &Value) -> CatalogResult<serde_json::Value> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::I64(i) => Ok(serde_json::Value::Number((*i).into())),
        Value::F64(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                CatalogError::new(
                    &format!("Non-finite number {} has no interchange form", f),
                    ErrorKind::EncodingError,
                )
            }),
        Value::Decimal(s) => {
            let number: serde_json::Number = serde_json::from_str(s)?;
            Ok(serde_json::Value::Number(number))
        }
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Date(d) => Ok(serde_json::Value::String(d.to_rfc3339())),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(value_to_interchange(item)?);
            }
            Ok(serde_json::Value::Array(out))
        }
        Value::Document(doc) => {
            let mut out = serde_json::Map::new();
            for (key, value) in doc.iter() {
                out.insert(key.clone(), value_to_interchange(value)?);
            }
            Ok(serde_json::Value::Object(out))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_read_string_absent_returns_none() {
        let adapter = TreeAdapter::new();
        let doc = doc! { "name": "user" };
        assert_eq!(adapter.read_string(&doc, "name").unwrap(), Some("user".to_string()));
        assert_eq!(adapter.read_string(&doc, "missing").unwrap(), None);
    }

    #[test]
    fn test_read_string_wrong_shape_carries_field_name() {
        let adapter = TreeAdapter::new();
        let doc = doc! { "name": 42i64 };
        let err = adapter.read_string(&doc, "name").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedMetadata);
        assert_eq!(err.message(), "name");
    }

    #[test]
    fn test_read_object_and_scalar() {
        let adapter = TreeAdapter::new();
        let doc = doc! { "version": { "value": "1.0" }, "count": 3i64 };
        let version = adapter.read_object(&doc, "version").unwrap().unwrap();
        assert_eq!(version.get("value").unwrap().as_str(), Some("1.0"));
        assert_eq!(adapter.read_scalar(&doc, "count").unwrap(), Some(Value::I64(3)));
        assert!(adapter.read_scalar(&doc, "version").is_err());
        assert!(adapter.read_object(&doc, "count").is_err());
    }

    #[test]
    fn test_read_string_list() {
        let adapter = TreeAdapter::new();
        let doc = doc! { "roles": ["admin", "user"], "bad": [1i64] };
        assert_eq!(
            adapter.read_string_list(&doc, "roles").unwrap(),
            Some(vec!["admin".to_string(), "user".to_string()])
        );
        assert!(adapter.read_string_list(&doc, "bad").is_err());
        assert_eq!(adapter.read_string_list(&doc, "missing").unwrap(), None);
    }

    #[test]
    fn test_read_object_list() {
        let adapter = TreeAdapter::new();
        let doc = doc! { "indexes": [{ "unique": true }, { "unique": false }] };
        let list = adapter.read_object_list(&doc, "indexes").unwrap().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].get("unique").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_append_builds_arrays() {
        let adapter = TreeAdapter::new();
        let mut doc = Document::new();
        adapter.new_array(&mut doc, "names").unwrap();
        adapter.append_string(&mut doc, "names", "a").unwrap();
        adapter.append_string(&mut doc, "names", "b").unwrap();
        let child = doc! { "x": 1i64 };
        adapter.append_object(&mut doc, "objs", child).unwrap();
        assert_eq!(doc.get("names").unwrap().as_array().unwrap().len(), 2);
        assert_eq!(doc.get("objs").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_append_to_non_array_fails() {
        let adapter = TreeAdapter::new();
        let mut doc = doc! { "names": "not-an-array" };
        assert!(adapter.append_string(&mut doc, "names", "a").is_err());
        // field is preserved on failure
        assert_eq!(doc.get("names").unwrap().as_str(), Some("not-an-array"));
    }

    #[test]
    fn test_fields_not_in() {
        let adapter = TreeAdapter::new();
        let doc = doc! { "name": "x", "custom": 1i64, "version": { "value": "1" } };
        let unknown = adapter.fields_not_in(&doc, &["name", "version"]);
        assert_eq!(unknown, vec!["custom".to_string()]);
    }

    #[test]
    fn test_expression_embedding_round_trip() {
        let adapter = TreeAdapter::new();
        let expr =
            Expression::from_text(r#"{"field":"age","op":">","rvalue":21}"#).unwrap();
        let mut doc = Document::new();
        adapter.put_expression(&mut doc, "query", &expr).unwrap();
        // stored as a real sub-document, not text
        assert!(doc.get("query").unwrap().as_document().is_some());
        let back = adapter.read_expression(&doc, "query").unwrap().unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn test_expression_embedding_array_form() {
        let adapter = TreeAdapter::new();
        let expr = Expression::from_text(r#"[{"login":"$asc"},{"age":"$desc"}]"#).unwrap();
        let mut doc = Document::new();
        adapter.put_expression(&mut doc, "sort", &expr).unwrap();
        let back = adapter.read_expression(&doc, "sort").unwrap().unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn test_numeric_normalization_categories() {
        // integral collapses to I64
        assert_eq!(
            interchange_to_value(&serde_json::from_str("42").unwrap()),
            Value::I64(42)
        );
        // float collapses to F64
        assert_eq!(
            interchange_to_value(&serde_json::from_str("2.5").unwrap()),
            Value::F64(2.5)
        );
        // arbitrary precision passes through untouched
        let big = "123456789012345678901234567890.123456789";
        assert_eq!(
            interchange_to_value(&serde_json::from_str(big).unwrap()),
            Value::Decimal(big.to_string())
        );
        let big_int = "123456789012345678901234567890";
        assert_eq!(
            interchange_to_value(&serde_json::from_str(big_int).unwrap()),
            Value::Decimal(big_int.to_string())
        );
    }

    #[test]
    fn test_lossless_round_trip_through_native_representation() {
        let adapter = TreeAdapter::new();
        let text = r#"{"big":123456789012345678901234567890.1,"f":1.5,"i":7,"s":"x","b":true,"n":null,"a":[1,2.5]}"#;
        let expr = Expression::from_text(text).unwrap();
        let mut doc = Document::new();
        adapter.put_expression(&mut doc, "q", &expr).unwrap();
        let back = adapter.read_expression(&doc, "q").unwrap().unwrap();
        assert_eq!(back.to_text(), expr.to_text());
    }

    #[test]
    fn test_read_expression_scalar_is_malformed() {
        let adapter = TreeAdapter::new();
        let doc = doc! { "query": "not-a-subdocument" };
        let err = adapter.read_expression(&doc, "query").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedMetadata);
    }
}
