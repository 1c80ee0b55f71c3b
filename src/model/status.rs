use chrono::{DateTime, Utc};
use std::fmt::{Debug, Display, Formatter};

use crate::common::{STATUS_ACTIVE, STATUS_DEPRECATED, STATUS_DISABLED};
use crate::errors::{CatalogError, CatalogResult, ErrorKind};

/// Lifecycle state of an [crate::model::EntitySchema].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetadataStatus {
    Active,
    Deprecated,
    Disabled,
}

impl MetadataStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataStatus::Active => STATUS_ACTIVE,
            MetadataStatus::Deprecated => STATUS_DEPRECATED,
            MetadataStatus::Disabled => STATUS_DISABLED,
        }
    }

    /// Parses the persisted string form of a status.
    pub fn parse(value: &str) -> CatalogResult<MetadataStatus> {
        match value {
            STATUS_ACTIVE => Ok(MetadataStatus::Active),
            STATUS_DEPRECATED => Ok(MetadataStatus::Deprecated),
            STATUS_DISABLED => Ok(MetadataStatus::Disabled),
            other => {
                log::error!("Unknown metadata status: {}", other);
                Err(CatalogError::new(other, ErrorKind::MalformedMetadata))
            }
        }
    }
}

impl Display for MetadataStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One audit entry in a schema's append-only status-change log, recording the
/// status that was in effect before the transition.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusChange {
    pub date: DateTime<Utc>,
    pub status: MetadataStatus,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            MetadataStatus::Active,
            MetadataStatus::Deprecated,
            MetadataStatus::Disabled,
        ] {
            assert_eq!(MetadataStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        let err = MetadataStatus::parse("frozen").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedMetadata);
        assert_eq!(err.message(), "frozen");
    }
}
