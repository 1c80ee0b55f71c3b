use indexmap::IndexMap;
use std::fmt::{Debug, Display, Formatter};

use crate::common::{Value, DOC_ID};
use crate::errors::{CatalogError, CatalogResult, ErrorKind};

/// Represents a document in the canonical tree model.
///
/// A document is composed of key-value pairs where the key is always a
/// [String] and the value is a [Value]. Keys keep their insertion order;
/// this matters for live index `key` documents, where the ordered
/// (field, direction) sequence defines index equivalence.
///
/// The `_id` field holds the document identity key and is set by the codec,
/// never by callers building metadata payloads.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> CatalogResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(CatalogError::new(
                "Document does not support empty key",
                ErrorKind::InvalidArgument,
            ));
        }
        self.data.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Returns the value associated with the key, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes the key, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Returns (key, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Returns the identity key of this document, if one has been set.
    pub fn id(&self) -> Option<&str> {
        self.get(DOC_ID).and_then(|v| v.as_str())
    }

    /// Sets the identity key of this document.
    pub fn set_id(&mut self, id: &str) -> CatalogResult<()> {
        self.put(DOC_ID, id)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

/// Creates a [Document] from key-value pairs.
///
/// ```ignore
/// let doc = doc! {
///     "name": "user",
///     "version": { "value": "1.0" },
///     "tags": ["a", "b"],
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::common::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut doc = $crate::common::Document::new();
        $(
            doc.put($key, $crate::doc_value!($value))
                .expect("Failed to put value in document");
        )*
        doc
    }};
}

/// Helper macro to convert values for the `doc!` macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
    }

    #[test]
    fn test_put_and_get() {
        let mut doc = Document::new();
        doc.put("name", "user").unwrap();
        doc.put("count", 3i64).unwrap();
        assert_eq!(doc.get("name"), Some(&Value::String("user".to_string())));
        assert_eq!(doc.get("count"), Some(&Value::I64(3)));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_put_empty_key_fails() {
        let mut doc = Document::new();
        let result = doc.put("", "value");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_keys_preserve_insertion_order() {
        let mut doc = Document::new();
        doc.put("z", 1i64).unwrap();
        doc.put("a", 2i64).unwrap();
        doc.put("m", 3i64).unwrap();
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_remove() {
        let mut doc = doc! { "a": 1i64, "b": 2i64 };
        assert_eq!(doc.remove("a"), Some(Value::I64(1)));
        assert_eq!(doc.remove("a"), None);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_id_helpers() {
        let mut doc = Document::new();
        assert_eq!(doc.id(), None);
        doc.set_id("user|").unwrap();
        assert_eq!(doc.id(), Some("user|"));
    }

    #[test]
    fn test_doc_macro_nested() {
        let doc = doc! {
            "name": "user",
            "version": { "value": "1.0" },
            "tags": ["a", "b"],
        };
        assert_eq!(doc.get("name").unwrap().as_str(), Some("user"));
        let version = doc.get("version").unwrap().as_document().unwrap();
        assert_eq!(version.get("value").unwrap().as_str(), Some("1.0"));
        let tags = doc.get("tags").unwrap().as_array().unwrap();
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_doc_macro_parenthesized_expressions() {
        // values that are not a single token are passed parenthesized
        let doc = doc! { "key": { "age": (-1i64) }, "dir": (-1i64) };
        let key = doc.get("key").unwrap().as_document().unwrap();
        assert_eq!(key.get("age").unwrap().as_i64(), Some(-1));
        assert_eq!(doc.get("dir").unwrap().as_i64(), Some(-1));
    }

    #[test]
    fn test_display() {
        let doc = doc! { "a": 1i64 };
        assert_eq!(format!("{}", doc), "{a: 1}");
    }
}
