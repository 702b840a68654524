//! Error types for the mirrorfs VFS abstraction.

use std::path::PathBuf;

/// VFS error type with contextual variants.
///
/// Every backend operation returns `Result<T, VfsError>`. Variants carry the
/// path and operation that produced them where applicable. Uses
/// `#[non_exhaustive]` for forward compatibility.
///
/// Each variant maps to a symbolic result-code name via
/// [`code_name`](VfsError::code_name); trace lines render that name so that
/// diagnostic output stays greppable across backends.
///
/// # Examples
///
/// ```rust
/// use mirrorfs::VfsError;
/// use std::path::PathBuf;
///
/// let err = VfsError::NotFound { path: PathBuf::from("/missing.db") };
/// assert_eq!(err.to_string(), "not found: /missing.db");
/// assert_eq!(err.code_name(), "NOT_FOUND");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The file could not be opened.
    #[error("cannot open: {path}")]
    CantOpen {
        /// The path that failed to open.
        path: PathBuf,
    },

    /// Permission denied for an operation.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The path where permission was denied.
        path: PathBuf,
        /// The operation that was denied.
        operation: &'static str,
    },

    /// Another connection holds a conflicting lock.
    #[error("resource busy: {operation}")]
    Busy {
        /// The operation that could not acquire the resource.
        operation: &'static str,
    },

    /// The storage medium is full.
    #[error("storage full: {path}")]
    Full {
        /// The path being written when space ran out.
        path: PathBuf,
    },

    /// The file is open read-only and a mutating operation was attempted.
    #[error("read-only file: {operation}")]
    ReadOnly {
        /// The mutating operation that was attempted.
        operation: &'static str,
    },

    /// A read returned fewer bytes than requested.
    #[error("short read: {path} (wanted {wanted}, got {got})")]
    ShortRead {
        /// The path that was read.
        path: PathBuf,
        /// Bytes requested.
        wanted: usize,
        /// Bytes actually available.
        got: usize,
    },

    /// The handle was used after being closed.
    #[error("handle closed: {operation}")]
    Closed {
        /// The operation attempted on the closed handle.
        operation: &'static str,
    },

    /// Operation is not supported by this backend.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    /// Configuration was rejected before any I/O happened.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: &'static str,
    },

    /// A backend-defined result code with no symbolic name.
    #[error("backend result code {0}")]
    Code(i32),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl VfsError {
    /// Symbolic name of this error's result code.
    ///
    /// Used when rendering trace lines; backend-defined [`VfsError::Code`]
    /// values have no symbolic name and render numerically instead (see
    /// the trace module).
    pub fn code_name(&self) -> &'static str {
        match self {
            VfsError::NotFound { .. } => "NOT_FOUND",
            VfsError::CantOpen { .. } => "CANTOPEN",
            VfsError::PermissionDenied { .. } => "PERM",
            VfsError::Busy { .. } => "BUSY",
            VfsError::Full { .. } => "FULL",
            VfsError::ReadOnly { .. } => "READONLY",
            VfsError::ShortRead { .. } => "IOERR_SHORT_READ",
            VfsError::Closed { .. } => "MISUSE",
            VfsError::NotSupported { .. } => "NOT_SUPPORTED",
            VfsError::InvalidConfig { .. } => "MISUSE",
            VfsError::Code(_) => "CODE",
            VfsError::Io { .. } => "IOERR",
        }
    }
}

impl From<std::io::Error> for VfsError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => VfsError::NotFound {
                path: PathBuf::new(),
            },
            std::io::ErrorKind::PermissionDenied => VfsError::PermissionDenied {
                path: PathBuf::new(),
                operation: "io",
            },
            _ => VfsError::Io {
                operation: "io",
                path: PathBuf::new(),
                source: error,
            },
        }
    }
}
