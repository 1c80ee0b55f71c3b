//! Opaque query/projection/sort expressions.
//!
//! The catalog treats the query DSL as an external collaborator: expressions
//! are consumed and produced only through their textual interchange form
//! (JSON). An [Expression] stores the canonical serialization of that text;
//! the document adapter embeds it as a nested sub-document and recovers it by
//! re-serializing through the same textual form, so there is exactly one code
//! path for the grammar.

use std::fmt::{Display, Formatter};

use crate::errors::{CatalogError, CatalogResult, ErrorKind};

/// An opaque DSL expression in canonical interchange form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    text: String,
}

impl Expression {
    /// Parses the textual interchange form of an expression.
    ///
    /// The text is validated through the interchange parser and stored in its
    /// canonical serialization, so two expressions that differ only in
    /// whitespace compare equal.
    pub fn from_text(text: &str) -> CatalogResult<Expression> {
        let node: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            log::error!("Failed to parse expression text: {}", e);
            CatalogError::new(
                &format!("Not a valid expression: {}", e),
                ErrorKind::MalformedMetadata,
            )
        })?;
        Ok(Expression {
            text: serde_json::to_string(&node)?,
        })
    }

    /// Returns the canonical textual form of this expression.
    pub fn to_text(&self) -> &str {
        &self.text
    }

    /// Parses the expression into its interchange tree.
    pub(crate) fn to_interchange(&self) -> CatalogResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.text)?)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A query expression, e.g. `{"field":"status","op":"=","rvalue":"active"}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryExpression {
    expr: Expression,
}

impl QueryExpression {
    pub fn from_text(text: &str) -> CatalogResult<QueryExpression> {
        Ok(QueryExpression {
            expr: Expression::from_text(text)?,
        })
    }

    pub fn to_text(&self) -> &str {
        self.expr.to_text()
    }

    pub(crate) fn expression(&self) -> &Expression {
        &self.expr
    }

    pub(crate) fn from_expression(expr: Expression) -> QueryExpression {
        QueryExpression { expr }
    }
}

/// A projection expression, e.g. `{"field":"*","include":true}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    expr: Expression,
}

impl Projection {
    pub fn from_text(text: &str) -> CatalogResult<Projection> {
        Ok(Projection {
            expr: Expression::from_text(text)?,
        })
    }

    pub fn to_text(&self) -> &str {
        self.expr.to_text()
    }

    pub(crate) fn expression(&self) -> &Expression {
        &self.expr
    }

    pub(crate) fn from_expression(expr: Expression) -> Projection {
        Projection { expr }
    }
}

/// A sort expression, e.g. `{"login":"$asc"}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    expr: Expression,
}

impl Sort {
    pub fn from_text(text: &str) -> CatalogResult<Sort> {
        Ok(Sort {
            expr: Expression::from_text(text)?,
        })
    }

    pub fn to_text(&self) -> &str {
        self.expr.to_text()
    }

    pub(crate) fn expression(&self) -> &Expression {
        &self.expr
    }

    pub(crate) fn from_expression(expr: Expression) -> Sort {
        Sort { expr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_canonicalizes_whitespace() {
        let a = Expression::from_text(r#"{ "field" : "login" }"#).unwrap();
        let b = Expression::from_text(r#"{"field":"login"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_text(), r#"{"field":"login"}"#);
    }

    #[test]
    fn test_from_text_rejects_invalid() {
        let result = Expression::from_text("{not json");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::MalformedMetadata);
    }

    #[test]
    fn test_high_precision_number_survives_canonicalization() {
        // arbitrary-precision literals must not be collapsed to f64 text
        let expr =
            Expression::from_text(r#"{"rvalue":123456789012345678901234567890.123456789}"#)
                .unwrap();
        assert!(expr
            .to_text()
            .contains("123456789012345678901234567890.123456789"));
    }

    #[test]
    fn test_typed_wrappers() {
        let q = QueryExpression::from_text(r#"{"field":"a","op":"=","rvalue":1}"#).unwrap();
        let p = Projection::from_text(r#"{"field":"*","include":true}"#).unwrap();
        let s = Sort::from_text(r#"{"login":"$asc"}"#).unwrap();
        assert!(q.to_text().contains("rvalue"));
        assert!(p.to_text().contains("include"));
        assert!(s.to_text().contains("$asc"));
    }
}
