use crate::common::Document;
use crate::dsl::{Projection, QueryExpression, Sort};
use crate::model::FieldAccess;

/// The shape of a [Field].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// A typed leaf value (`string`, `integer`, `date`, ...). The type name
    /// is opaque to the catalog; type resolution belongs to the runtime.
    Simple { field_type: String },
    /// A nested object with its own field tree.
    Object { fields: Vec<Field> },
    /// An ordered collection of elements of one shape.
    Array { element: Box<ArrayElement> },
    /// A reference to another entity, resolved at query time through the
    /// attached query/projection/sort expressions.
    Reference {
        entity: String,
        version: String,
        query: Option<QueryExpression>,
        projection: Option<Projection>,
        sort: Option<Sort>,
    },
}

/// Element shape of an array field.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayElement {
    Simple { field_type: String },
    Object { fields: Vec<Field> },
}

/// One node in an entity's field tree.
///
/// `properties` carries any unknown/custom sub-fields found while parsing,
/// so round-tripping a document written by a newer producer does not drop
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub access: FieldAccess,
    pub properties: Document,
}

impl Field {
    pub fn simple(name: &str, field_type: &str) -> Field {
        Field {
            name: name.to_string(),
            kind: FieldKind::Simple {
                field_type: field_type.to_string(),
            },
            access: FieldAccess::new(),
            properties: Document::new(),
        }
    }

    pub fn object(name: &str, fields: Vec<Field>) -> Field {
        Field {
            name: name.to_string(),
            kind: FieldKind::Object { fields },
            access: FieldAccess::new(),
            properties: Document::new(),
        }
    }

    pub fn array(name: &str, element: ArrayElement) -> Field {
        Field {
            name: name.to_string(),
            kind: FieldKind::Array {
                element: Box::new(element),
            },
            access: FieldAccess::new(),
            properties: Document::new(),
        }
    }

    pub fn with_access(mut self, access: FieldAccess) -> Field {
        self.access = access;
        self
    }
}

/// Walks a field tree depth-first, yielding each field with its full dotted
/// path. Fields inside an array's object element get a `*` path segment for
/// the element position, e.g. `addresses.*.zip`.
pub fn walk_fields<'a>(fields: &'a [Field]) -> Vec<(String, &'a Field)> {
    let mut out = Vec::new();
    collect_fields(fields, "", &mut out);
    out
}

fn collect_fields<'a>(fields: &'a [Field], prefix: &str, out: &mut Vec<(String, &'a Field)>) {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", prefix, field.name)
        };
        match &field.kind {
            FieldKind::Object { fields: children } => {
                out.push((path.clone(), field));
                collect_fields(children, &path, out);
            }
            FieldKind::Array { element } => {
                out.push((path.clone(), field));
                if let ArrayElement::Object { fields: children } = element.as_ref() {
                    let element_path = format!("{}.*", path);
                    collect_fields(children, &element_path, out);
                }
            }
            _ => out.push((path, field)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_simple_fields() {
        let fields = vec![Field::simple("id", "uid"), Field::simple("email", "string")];
        let walked = walk_fields(&fields);
        let paths: Vec<&str> = walked.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["id", "email"]);
    }

    #[test]
    fn test_walk_nested_object() {
        let fields = vec![Field::object(
            "address",
            vec![Field::simple("city", "string"), Field::simple("zip", "string")],
        )];
        let walked = walk_fields(&fields);
        let paths: Vec<&str> = walked.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["address", "address.city", "address.zip"]);
    }

    #[test]
    fn test_walk_array_of_objects() {
        let fields = vec![Field::array(
            "addresses",
            ArrayElement::Object {
                fields: vec![Field::simple("zip", "string")],
            },
        )];
        let walked = walk_fields(&fields);
        let paths: Vec<&str> = walked.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["addresses", "addresses.*.zip"]);
    }
}
