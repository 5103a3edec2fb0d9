//! Registry error types.

use crate::model::package::PackageId;
use crate::model::time::Timestamp;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Coarse error category exposed to callers and scenario outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-domain input.
    InvalidArgument,
    /// The referenced package is not present at the requested instant.
    NotFound,
}

impl ErrorKind {
    /// Stable string code used in log lines and replay outputs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
        }
    }
}

/// Detail for rejected input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    NegativeTimestamp(Timestamp),
    EmptyId,
    /// The id has already been created (at any time).
    DuplicateId(PackageId),
    NegativeWeight(i64),
    EmptyDestination,
    NegativeCount(i64),
    /// A field that must be an integer arrived as another value.
    NotAnInteger { field: &'static str, raw: String },
    /// A field that must be a string arrived as another value.
    NotAString { field: &'static str, raw: String },
}

impl Display for ArgumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeTimestamp(at) => write!(f, "timestamp must be >= 0, got {at}"),
            Self::EmptyId => write!(f, "tracking id must not be empty"),
            Self::DuplicateId(id) => write!(f, "tracking id already created: {id}"),
            Self::NegativeWeight(weight) => write!(f, "weight must be >= 0, got {weight}"),
            Self::EmptyDestination => write!(f, "destination must not be empty"),
            Self::NegativeCount(n) => write!(f, "count must be >= 0, got {n}"),
            Self::NotAnInteger { field, raw } => write!(f, "{field} must be an integer, got {raw}"),
            Self::NotAString { field, raw } => write!(f, "{field} must be a string, got {raw}"),
        }
    }
}

impl Error for ArgumentError {}

/// Error returned by registry and report operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidArgument(ArgumentError),
    NotFound(PackageId),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Returns whether this is a duplicate-id rejection.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::InvalidArgument(ArgumentError::DuplicateId(_)))
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(err) => write!(f, "invalid argument: {err}"),
            Self::NotFound(id) => write!(f, "package not found: {id}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<ArgumentError> for RegistryError {
    fn from(value: ArgumentError) -> Self {
        Self::InvalidArgument(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ArgumentError, ErrorKind, RegistryError};
    use std::error::Error;

    #[test]
    fn kinds_map_to_stable_codes() {
        let invalid: RegistryError = ArgumentError::EmptyId.into();
        assert_eq!(invalid.kind(), ErrorKind::InvalidArgument);
        assert_eq!(invalid.kind().as_str(), "invalid_argument");

        let missing = RegistryError::NotFound("A".to_string());
        assert_eq!(missing.kind().as_str(), "not_found");
        assert!(missing.source().is_none());
    }

    #[test]
    fn duplicate_is_an_invalid_argument() {
        let err: RegistryError = ArgumentError::DuplicateId("A".to_string()).into();
        assert!(err.is_duplicate());
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "invalid argument: tracking id already created: A"
        );
    }
}
