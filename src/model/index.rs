use std::fmt::{Debug, Display, Formatter};

use crate::common::SortOrder;

/// One sort key of an [Index]: a dotted field path plus a direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexSortKey {
    pub field: String,
    pub order: SortOrder,
}

impl IndexSortKey {
    pub fn asc(field: &str) -> IndexSortKey {
        IndexSortKey {
            field: field.to_string(),
            order: SortOrder::Ascending,
        }
    }

    pub fn desc(field: &str) -> IndexSortKey {
        IndexSortKey {
            field: field.to_string(),
            order: SortOrder::Descending,
        }
    }
}

/// A declared secondary index: a named, ordered list of sort keys plus a
/// uniqueness flag.
///
/// Two indexes are *field-equivalent* if their ordered (path, direction)
/// sequences match exactly, and *option-equivalent* if their uniqueness
/// flags match. The reconciler uses both notions to converge a live
/// collection toward its declared index set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Index {
    name: Option<String>,
    unique: bool,
    fields: Vec<IndexSortKey>,
}

impl Index {
    pub fn new(fields: Vec<IndexSortKey>) -> Index {
        Index {
            name: None,
            unique: false,
            fields,
        }
    }

    pub fn with_name(mut self, name: &str) -> Index {
        self.name = Some(name.to_string());
        self
    }

    pub fn unique(mut self, unique: bool) -> Index {
        self.unique = unique;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn fields(&self) -> &[IndexSortKey] {
        &self.fields
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, key) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key.field, key.order.direction())?;
        }
        write!(f, "}} unique={}", self.unique)
    }
}
