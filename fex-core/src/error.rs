//! src/error.rs
//! ============================================================================
//! # `SessionError`: Unified Error Type for Session Operations
//!
//! Every session-manager operation returns `Result<T, SessionError>`. Each
//! variant carries the path it concerns and, for filesystem failures, the
//! underlying `io::Error` as its source. Nothing here is fatal: the caller
//! decides how to surface the error and the session stays consistent.

use std::{fmt, io, path::PathBuf};

use compact_str::CompactString;
use smallvec::{SmallVec, smallvec};
use thiserror::Error;
use tracing::{Level, event};

/// Convenient alias carrying the session error type
pub type SessionResult<T> = Result<T, SessionError>;

/// Whether a failing operation concerned a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    #[must_use]
    pub const fn from_is_dir(is_dir: bool) -> Self {
        if is_dir { Self::Folder } else { Self::File }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "File"),
            Self::Folder => write!(f, "Folder"),
        }
    }
}

/// Field-less discriminant of [`SessionError`], cheap to copy and match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidDirectory,
    FileTooLarge,
    CannotOpen,
    CannotSave,
    AlreadyExists,
    EmptyName,
    InvalidName,
    CreateFailed,
    RenameFailed,
    DeleteFailed,
    ImageDecodeFailed,
    NothingSelected,
    NothingLoaded,
    UnsavedChanges,
}

/// Error returned by session operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    // ────────────────────────────────────────────────────────────
    // Navigation
    // ────────────────────────────────────────────────────────────
    #[error("Not an existing directory: {path:?}")]
    InvalidDirectory { path: PathBuf },

    // ────────────────────────────────────────────────────────────
    // Loading and saving
    // ────────────────────────────────────────────────────────────
    #[error("File too large: {path:?} is {size} bytes (maximum {limit} bytes)")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Could not open file {path:?}: {source}")]
    CannotOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not save file {path:?}: {source}")]
    CannotSave {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // ────────────────────────────────────────────────────────────
    // Create / rename / delete
    // ────────────────────────────────────────────────────────────
    #[error("{kind} already exists: {path:?}")]
    AlreadyExists { path: PathBuf, kind: EntryKind },

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Invalid name '{name}': {reason}")]
    InvalidName {
        name: CompactString,
        reason: &'static str,
    },

    #[error("Could not create {kind} {path:?}: {source}")]
    CreateFailed {
        path: PathBuf,
        kind: EntryKind,
        #[source]
        source: io::Error,
    },

    #[error("Error renaming {from:?} to {to:?}: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error deleting {path:?}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // ────────────────────────────────────────────────────────────
    // Preview
    // ────────────────────────────────────────────────────────────
    #[error("Failed to load image {path:?}: {reason}")]
    ImageDecodeFailed { path: PathBuf, reason: String },

    // ────────────────────────────────────────────────────────────
    // Session state
    // ────────────────────────────────────────────────────────────
    #[error("Nothing selected to {operation}")]
    NothingSelected { operation: &'static str },

    #[error("No text file is loaded for editing")]
    NothingLoaded,

    #[error("Unsaved changes in {path:?}; save or discard them first")]
    UnsavedChanges { path: PathBuf },
}

impl SessionError {
    /// Discriminant for matching without destructuring.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDirectory { .. } => ErrorKind::InvalidDirectory,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::CannotOpen { .. } => ErrorKind::CannotOpen,
            Self::CannotSave { .. } => ErrorKind::CannotSave,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::EmptyName => ErrorKind::EmptyName,
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::CreateFailed { .. } => ErrorKind::CreateFailed,
            Self::RenameFailed { .. } => ErrorKind::RenameFailed,
            Self::DeleteFailed { .. } => ErrorKind::DeleteFailed,
            Self::ImageDecodeFailed { .. } => ErrorKind::ImageDecodeFailed,
            Self::NothingSelected { .. } => ErrorKind::NothingSelected,
            Self::NothingLoaded => ErrorKind::NothingLoaded,
            Self::UnsavedChanges { .. } => ErrorKind::UnsavedChanges,
        }
    }

    /// The OS-level cause, for variants that wrap one.
    #[must_use]
    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            Self::CannotOpen { source, .. }
            | Self::CannotSave { source, .. }
            | Self::CreateFailed { source, .. }
            | Self::RenameFailed { source, .. }
            | Self::DeleteFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    // ────────────────────────────────────────────────────────────
    // Attribute helpers – used for log grouping
    // ────────────────────────────────────────────────────────────
    #[inline]
    #[must_use]
    pub const fn operation_type(&self) -> &'static str {
        match self {
            Self::InvalidDirectory { .. }                   => "navigation",

            Self::FileTooLarge { .. }
            | Self::CannotOpen { .. }                       => "file_load",

            Self::CannotSave { .. }                         => "file_save",

            Self::AlreadyExists { .. }
            | Self::EmptyName
            | Self::InvalidName { .. }                      => "input_validation",

            Self::CreateFailed { .. }
            | Self::RenameFailed { .. }
            | Self::DeleteFailed { .. }                     => "file_system",

            Self::ImageDecodeFailed { .. }                  => "image_preview",

            Self::NothingSelected { .. }
            | Self::NothingLoaded
            | Self::UnsavedChanges { .. }                   => "invalid_state",
        }
    }

    #[inline]
    #[must_use]
    const fn error_marker(&self) -> &'static str {
        match self {
            Self::InvalidDirectory { .. }   => "ERROR_INVALID_DIRECTORY",

            Self::FileTooLarge { .. }       => "ERROR_FILE_TOO_LARGE",

            Self::CannotOpen { .. }         => "ERROR_CANNOT_OPEN",

            Self::CannotSave { .. }         => "ERROR_CANNOT_SAVE",

            Self::AlreadyExists { .. }      => "ERROR_ALREADY_EXISTS",

            Self::EmptyName                 => "ERROR_EMPTY_NAME",

            Self::InvalidName { .. }        => "ERROR_INVALID_NAME",

            Self::CreateFailed { .. }       => "ERROR_CREATE_FAILED",

            Self::RenameFailed { .. }       => "ERROR_RENAME_FAILED",

            Self::DeleteFailed { .. }       => "ERROR_DELETE_FAILED",

            Self::ImageDecodeFailed { .. }  => "ERROR_IMAGE_DECODE",

            Self::NothingSelected { .. }    => "ERROR_NOTHING_SELECTED",

            Self::NothingLoaded             => "ERROR_NOTHING_LOADED",

            Self::UnsavedChanges { .. }     => "ERROR_UNSAVED_CHANGES",
        }
    }

    // ────────────────────────────────────────────────────────────
    // Structured-field extraction (SmallVec avoids heap ≤4 items)
    // ────────────────────────────────────────────────────────────
    #[must_use]
    pub fn extract_trace_fields(&self) -> SmallVec<[(&'static str, CompactString); 4]> {
        match self {
            Self::InvalidDirectory { path }
            | Self::CannotOpen { path, .. }
            | Self::CannotSave { path, .. }
            | Self::AlreadyExists { path, .. }
            | Self::CreateFailed { path, .. }
            | Self::DeleteFailed { path, .. }
            | Self::ImageDecodeFailed { path, .. }
            | Self::UnsavedChanges { path } => smallvec![
                ("path", CompactString::from(path.to_string_lossy())),
            ],

            Self::FileTooLarge { path, size, limit } => smallvec![
                ("path", CompactString::from(path.to_string_lossy())),
                ("size", CompactString::from(size.to_string())),
                ("limit", CompactString::from(limit.to_string())),
            ],

            Self::RenameFailed { from, to, .. } => smallvec![
                ("from", CompactString::from(from.to_string_lossy())),
                ("to", CompactString::from(to.to_string_lossy())),
            ],

            Self::InvalidName { name, .. } => smallvec![("name", name.clone())],

            _ => smallvec![],
        }
    }

    /// Emit one structured error event and hand the error back unchanged.
    #[must_use]
    pub fn trace(self) -> Self {
        let extra: SmallVec<[(&'static str, CompactString); 4]> = self.extract_trace_fields();

        event!(
            Level::ERROR,
            marker = self.error_marker(),
            op_type = self.operation_type(),
            error = %self,
            extra = ?extra,
        );

        self
    }

    // ────────────────────────────────────────────────────────────
    // Smart constructors
    // ────────────────────────────────────────────────────────────
    pub fn invalid_directory<P: Into<PathBuf>>(path: P) -> Self {
        Self::InvalidDirectory { path: path.into() }
    }

    pub fn cannot_open<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::CannotOpen {
            path: path.into(),
            source,
        }
    }

    pub fn cannot_save<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::CannotSave {
            path: path.into(),
            source,
        }
    }

    pub fn already_exists<P: Into<PathBuf>>(path: P, kind: EntryKind) -> Self {
        Self::AlreadyExists {
            path: path.into(),
            kind,
        }
    }

    #[must_use]
    pub fn invalid_name(name: &str, reason: &'static str) -> Self {
        Self::InvalidName {
            name: CompactString::new(name),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn kind_matches_variant() {
        let err = SessionError::invalid_directory("/nope");
        assert_eq!(err.kind(), ErrorKind::InvalidDirectory);
        assert_eq!(err.operation_type(), "navigation");

        let err = SessionError::cannot_save(
            "/ro/file.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), ErrorKind::CannotSave);
        assert_eq!(
            err.io_source().map(io::Error::kind),
            Some(io::ErrorKind::PermissionDenied)
        );
    }

    #[test]
    fn display_carries_detail() {
        let err = SessionError::already_exists(Path::new("/tmp/d/x.txt"), EntryKind::File);
        assert_eq!(err.to_string(), "File already exists: \"/tmp/d/x.txt\"");

        let err = SessionError::FileTooLarge {
            path: PathBuf::from("big.log"),
            size: 6,
            limit: 5,
        };
        assert!(err.to_string().contains("maximum 5 bytes"));
    }

    #[test]
    fn trace_fields_for_rename() {
        let err = SessionError::RenameFailed {
            from: PathBuf::from("a"),
            to: PathBuf::from("b"),
            source: io::Error::other("boom"),
        };
        let fields = err.extract_trace_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "from");

        // trace() must hand back the same error
        assert_eq!(err.trace().kind(), ErrorKind::RenameFailed);
    }
}
