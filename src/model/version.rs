use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

use crate::common::DELIMITER_ID;
use crate::errors::{CatalogError, CatalogResult, ErrorKind};

/// A schema version: a string value plus optional extension and changelog
/// metadata. Equality and ordering consider only the `value`; two versions
/// with the same value but different changelogs identify the same schema
/// document.
#[derive(Clone, Debug, Eq)]
pub struct Version {
    value: String,
    extends_versions: Vec<String>,
    changelog: Option<String>,
}

impl Version {
    /// Creates a version from its value.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::InvalidArgument] if the value is empty or
    /// contains the reserved identity-key delimiter.
    pub fn new(value: &str) -> CatalogResult<Version> {
        if value.is_empty() {
            log::error!("Version value cannot be empty");
            return Err(CatalogError::new("version", ErrorKind::InvalidArgument));
        }
        if value.contains(DELIMITER_ID) {
            log::error!("Version value cannot contain '{}': {}", DELIMITER_ID, value);
            return Err(CatalogError::new("version", ErrorKind::InvalidArgument));
        }
        Ok(Version {
            value: value.to_string(),
            extends_versions: Vec::new(),
            changelog: None,
        })
    }

    pub fn with_changelog(mut self, changelog: &str) -> Version {
        self.changelog = Some(changelog.to_string());
        self
    }

    pub fn with_extends_versions(mut self, extends: Vec<String>) -> Version {
        self.extends_versions = extends;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn extends_versions(&self) -> &[String] {
        &self.extends_versions
    }

    pub fn changelog(&self) -> Option<&str> {
        self.changelog.as_deref()
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid_version() {
        let version = Version::new("1.0.0").unwrap();
        assert_eq!(version.value(), "1.0.0");
        assert!(version.extends_versions().is_empty());
        assert!(version.changelog().is_none());
    }

    #[test]
    fn test_empty_value_rejected() {
        let result = Version::new("");
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_delimiter_in_value_rejected() {
        let result = Version::new("1.0|x");
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_equality_is_by_value_only() {
        let a = Version::new("1.0").unwrap().with_changelog("initial");
        let b = Version::new("1.0").unwrap();
        let c = Version::new("2.0").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_builders() {
        let version = Version::new("2.0")
            .unwrap()
            .with_changelog("adds email")
            .with_extends_versions(vec!["1.0".to_string()]);
        assert_eq!(version.changelog(), Some("adds email"));
        assert_eq!(version.extends_versions(), &["1.0".to_string()]);
    }
}
