//! Error types shared by every store subsystem
//!
//! Error codes:
//! - SLICER_VALIDATOR_FAILED (REJECT)
//! - SLICER_PROPERTY_MISSING (REJECT)
//! - SLICER_CONFLICT (REJECT)
//! - SLICER_UNKNOWN_COLUMN (REJECT)
//! - SLICER_CARDINALITY (REJECT)
//! - SLICER_INVALID_CONFIG (REJECT)
//! - SLICER_NOT_FOUND (ERROR)
//! - SLICER_IO_ERROR (ERROR)
//! - SLICER_ENCODING_ERROR (ERROR)
//! - SLICER_CORRUPTION (FATAL)

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::column::ObjectId;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The caller's request was rejected; the store is unchanged or tombstoned
    Reject,
    /// An operation failed against the filesystem
    Error,
    /// Persisted data cannot be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Error codes raised by columns, slices, schemas and stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlicerErrorCode {
    /// Object rejected by the store validator, or attribute outside a column domain
    ValidatorFailed,
    /// Mandatory column was not given a value
    PropertyMissing,
    /// Duplicate column name, or schema/store domain mismatch
    Conflict,
    /// Filter names a column the store does not have
    UnknownColumn,
    /// Column name cannot be used as a directory name
    InvalidColumnName,
    /// `first()`/`only()` found the wrong number of objects
    Cardinality,
    /// Configuration file unreadable or out of range
    InvalidConfig,
    /// Persisted file absent during a load step
    NotFound,
    /// Filesystem failure
    Io,
    /// Value could not be serialized
    Encoding,
    /// Malformed persisted data or checksum mismatch
    Corruption,
}

impl SlicerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SlicerErrorCode::ValidatorFailed => "SLICER_VALIDATOR_FAILED",
            SlicerErrorCode::PropertyMissing => "SLICER_PROPERTY_MISSING",
            SlicerErrorCode::Conflict => "SLICER_CONFLICT",
            SlicerErrorCode::UnknownColumn => "SLICER_UNKNOWN_COLUMN",
            SlicerErrorCode::InvalidColumnName => "SLICER_INVALID_COLUMN_NAME",
            SlicerErrorCode::Cardinality => "SLICER_CARDINALITY",
            SlicerErrorCode::InvalidConfig => "SLICER_INVALID_CONFIG",
            SlicerErrorCode::NotFound => "SLICER_NOT_FOUND",
            SlicerErrorCode::Io => "SLICER_IO_ERROR",
            SlicerErrorCode::Encoding => "SLICER_ENCODING_ERROR",
            SlicerErrorCode::Corruption => "SLICER_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SlicerErrorCode::NotFound | SlicerErrorCode::Io | SlicerErrorCode::Encoding => {
                Severity::Error
            }
            SlicerErrorCode::Corruption => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SlicerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error type with full context
#[derive(Debug)]
pub struct SlicerError {
    code: SlicerErrorCode,
    message: String,
    column: Option<String>,
    object_id: Option<ObjectId>,
    path: Option<PathBuf>,
    source: Option<io::Error>,
}

impl SlicerError {
    fn new(code: SlicerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            column: None,
            object_id: None,
            path: None,
            source: None,
        }
    }

    /// Object rejected by the store-wide validator
    pub fn object_rejected() -> Self {
        Self::new(
            SlicerErrorCode::ValidatorFailed,
            "Object rejected by store validator",
        )
    }

    /// Attribute does not satisfy a column domain
    pub fn attribute_rejected(
        column: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let column = column.into();
        let mut err = Self::new(
            SlicerErrorCode::ValidatorFailed,
            format!(
                "Column '{}': expected {}, got {}",
                column,
                expected.into(),
                actual.into()
            ),
        );
        err.column = Some(column);
        err
    }

    /// Mandatory column without default received no value
    pub fn property_missing(column: impl Into<String>, object_id: ObjectId) -> Self {
        let column = column.into();
        let mut err = Self::new(
            SlicerErrorCode::PropertyMissing,
            format!(
                "Column '{}' has no default, but object {} was stored without a value",
                column, object_id
            ),
        );
        err.column = Some(column);
        err.object_id = Some(object_id);
        err
    }

    /// Column name already registered
    pub fn column_exists(column: impl Into<String>) -> Self {
        let column = column.into();
        let mut err = Self::new(
            SlicerErrorCode::Conflict,
            format!("Column '{}' already exists", column),
        );
        err.column = Some(column);
        err
    }

    /// Store column and schema column share a name but not a domain
    pub fn domain_mismatch(column: impl Into<String>) -> Self {
        let column = column.into();
        let mut err = Self::new(
            SlicerErrorCode::Conflict,
            format!(
                "Schema column '{}' does not match the subscriber's column of the same name",
                column
            ),
        );
        err.column = Some(column);
        err
    }

    /// Filter references a missing column
    pub fn unknown_column(column: impl Into<String>) -> Self {
        let column = column.into();
        let mut err = Self::new(
            SlicerErrorCode::UnknownColumn,
            format!("Column '{}' does not exist", column),
        );
        err.column = Some(column);
        err
    }

    /// Column name rejected at registration
    pub fn invalid_column_name(column: impl Into<String>, reason: &str) -> Self {
        let column = column.into();
        let mut err = Self::new(
            SlicerErrorCode::InvalidColumnName,
            format!("Column name '{}' {}", column, reason),
        );
        err.column = Some(column);
        err
    }

    /// Wrong number of objects in a slice
    pub fn cardinality(message: impl Into<String>) -> Self {
        Self::new(SlicerErrorCode::Cardinality, message)
    }

    /// Configuration rejected
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(SlicerErrorCode::InvalidConfig, message)
    }

    /// Expected persisted file is missing
    pub fn not_found(path: &Path) -> Self {
        let mut err = Self::new(
            SlicerErrorCode::NotFound,
            format!("'{}' not found", path.display()),
        );
        err.path = Some(path.to_path_buf());
        err
    }

    /// Filesystem failure at a path
    pub fn io_error_at_path(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            let mut err = Self::not_found(path);
            err.source = Some(source);
            return err;
        }
        let mut err = Self::new(
            SlicerErrorCode::Io,
            format!("I/O failure at '{}': {}", path.display(), source),
        );
        err.path = Some(path.to_path_buf());
        err.source = Some(source);
        err
    }

    /// Value could not be serialized
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(SlicerErrorCode::Encoding, message)
    }

    /// Persisted file cannot be decoded
    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        let mut err = Self::new(
            SlicerErrorCode::Corruption,
            format!("Malformed file '{}': {}", path.display(), reason.into()),
        );
        err.path = Some(path.to_path_buf());
        err
    }

    /// Persisted file does not match the checksum in the manifest
    pub fn checksum_mismatch(path: &Path, expected: &str, actual: &str) -> Self {
        let mut err = Self::new(
            SlicerErrorCode::Corruption,
            format!(
                "Checksum mismatch for '{}': manifest says {}, file has {}",
                path.display(),
                expected,
                actual
            ),
        );
        err.path = Some(path.to_path_buf());
        err
    }

    /// Returns the error code
    pub fn code(&self) -> SlicerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the column name if applicable
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Returns the object id if applicable
    pub fn object_id(&self) -> Option<ObjectId> {
        self.object_id
    }

    /// Returns the path if applicable
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SlicerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for SlicerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type SlicerResult<T> = Result<T, SlicerError>;
