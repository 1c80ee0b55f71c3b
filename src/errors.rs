use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for catalog operations.
///
/// Each kind describes one category of failure in the metadata catalog.
/// The first band (`InvalidArgument`, `InvalidDataStore`) covers precondition
/// violations detected before any I/O. The second band covers catalog-invariant
/// violations detected after a lookup. The third band (`DatabaseError`,
/// `EntityIndexNotCreated`, `DuplicateKey`) wraps backing-store failures.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Caller-supplied input failed a precondition; detected before any I/O.
    InvalidArgument,
    /// The data-store reference is not a supported document-store reference.
    InvalidDataStore,
    /// No entity info document exists for the given name.
    MissingEntityInfo,
    /// No schema document exists for the given (name, version) pair.
    UnknownVersion,
    /// A metadata document for this name or (name, version) already exists.
    DuplicateMetadata,
    /// The target version is the entity's current default and cannot be disabled.
    DisabledDefaultVersion,
    /// A document field was present but had the wrong shape.
    MalformedMetadata,
    /// The backing store driver reported a failure; carries its message verbatim.
    DatabaseError,
    /// Index listing, creation, or drop failed during reconciliation.
    EntityIndexNotCreated,
    /// Driver-level duplicate-key condition on a single document write.
    DuplicateKey,
    /// Error encoding or decoding the textual interchange format.
    EncodingError,
    /// Internal error (usually indicates a bug).
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::InvalidDataStore => write!(f, "Invalid data store"),
            ErrorKind::MissingEntityInfo => write!(f, "Missing entity info"),
            ErrorKind::UnknownVersion => write!(f, "Unknown version"),
            ErrorKind::DuplicateMetadata => write!(f, "Duplicate metadata"),
            ErrorKind::DisabledDefaultVersion => write!(f, "Disabled default version"),
            ErrorKind::MalformedMetadata => write!(f, "Malformed metadata"),
            ErrorKind::DatabaseError => write!(f, "Database error"),
            ErrorKind::EntityIndexNotCreated => write!(f, "Entity index not created"),
            ErrorKind::DuplicateKey => write!(f, "Duplicate key"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom catalog error type.
///
/// `CatalogError` carries the error message, kind, an optional cause, and an
/// operation breadcrumb trail. Every public catalog operation pushes a label
/// describing the operation and its key arguments onto any error it surfaces,
/// so failures reaching the caller are annotated with the full call context
/// (innermost frame first) rather than a bare field name.
#[derive(Clone)]
pub struct CatalogError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<CatalogError>>,
    context: Vec<String>,
    backtrace: Backtrace,
}

impl CatalogError {
    /// Creates a new `CatalogError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        CatalogError {
            message: message.to_string(),
            error_kind,
            cause: None,
            context: Vec::new(),
            backtrace: Backtrace::new(),
        }
    }

    /// Creates a new `CatalogError` with a cause error.
    ///
    /// The cause error is preserved for debugging; its breadcrumb trail is
    /// carried over so the outermost error keeps the full context.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: CatalogError) -> Self {
        let context = cause.context.clone();
        CatalogError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            context,
            backtrace: Backtrace::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&CatalogError> {
        self.cause.as_deref()
    }

    /// The operation breadcrumb trail, innermost frame first.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Appends an operation label to the breadcrumb trail.
    ///
    /// Consumes and returns the error so it composes with `map_err`:
    /// `op().map_err(|e| e.push_context("getEntityInfo(user)"))`.
    pub fn push_context(mut self, label: impl Into<String>) -> Self {
        self.context.push(label.into());
        self
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.context.is_empty() {
            write!(f, " [{}]", self.context.join(" <- "))?;
        }
        Ok(())
    }
}

impl Debug for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self, cause),
            None => write!(f, "{}\n{:?}", self, self.backtrace),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::new(
            &format!("Interchange encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<String> for CatalogError {
    fn from(msg: String) -> Self {
        CatalogError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for CatalogError {
    fn from(msg: &str) -> Self {
        CatalogError::new(msg, ErrorKind::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_error_new_creates_error() {
        let error = CatalogError::new("An error occurred", ErrorKind::DatabaseError);
        assert_eq!(error.message(), "An error occurred");
        assert_eq!(error.kind(), &ErrorKind::DatabaseError);
        assert!(error.cause().is_none());
        assert!(error.context().is_empty());
    }

    #[test]
    fn catalog_error_with_cause_keeps_chain() {
        let cause = CatalogError::new("duplicate key: user|", ErrorKind::DuplicateKey);
        let error =
            CatalogError::new_with_cause("1.0", ErrorKind::DuplicateMetadata, cause);
        assert_eq!(error.kind(), &ErrorKind::DuplicateMetadata);
        assert_eq!(error.cause().unwrap().kind(), &ErrorKind::DuplicateKey);
        assert!(error.source().is_some());
    }

    #[test]
    fn push_context_builds_breadcrumb_trail() {
        let error = CatalogError::new("version", ErrorKind::InvalidArgument)
            .push_context("getEntityMetadata(user:)")
            .push_context("getAccess");
        assert_eq!(
            error.context(),
            &["getEntityMetadata(user:)".to_string(), "getAccess".to_string()]
        );
        let formatted = format!("{}", error);
        assert!(formatted.contains("getEntityMetadata(user:) <- getAccess"));
    }

    #[test]
    fn new_with_cause_carries_over_context() {
        let cause = CatalogError::new("bad shape", ErrorKind::MalformedMetadata)
            .push_context("convert[info]");
        let error = CatalogError::new_with_cause("conversion failed", ErrorKind::MalformedMetadata, cause);
        assert_eq!(error.context(), &["convert[info]".to_string()]);
    }

    #[test]
    fn display_without_context_is_bare_message() {
        let error = CatalogError::new("entityName", ErrorKind::InvalidArgument);
        assert_eq!(format!("{}", error), "entityName");
    }

    #[test]
    fn debug_formats_with_cause() {
        let cause = CatalogError::new("io failure", ErrorKind::DatabaseError);
        let error = CatalogError::new_with_cause("write failed", ErrorKind::DatabaseError, cause);
        let formatted = format!("{:?}", error);
        assert!(formatted.contains("write failed"));
        assert!(formatted.contains("Caused by:"));
    }

    #[test]
    fn from_str_conversions() {
        let err: CatalogError = "boom".into();
        assert_eq!(err.kind(), &ErrorKind::InternalError);
        let err: CatalogError = String::from("boom").into();
        assert_eq!(err.kind(), &ErrorKind::InternalError);
    }

    #[test]
    fn from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err: CatalogError = parse_err.into();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }
}
