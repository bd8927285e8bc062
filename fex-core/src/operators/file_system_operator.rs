//! ``src/operators/file_system_operator.rs``
//! ============================================================================
//! # File System Operator: the session's only writer to disk
//!
//! Synchronous create / write / rename / delete primitives plus the text
//! loader. Every failure is mapped to a `SessionError` carrying the OS cause;
//! nothing here touches session state.

use std::fmt;
use std::fs::{self, Metadata, OpenOptions};
use std::io::{self, ErrorKind as IoErrorKind};
use std::path::{self, Component, MAIN_SEPARATOR, Path, PathBuf};

use tracing::{Span, debug, info, instrument};

use crate::error::{EntryKind, SessionError, SessionResult};

#[derive(Debug, Clone)]
pub enum FileSystemOperation<'a> {
    CreateFile { path: PathBuf },

    CreateDirectory { path: PathBuf },

    Write { path: PathBuf, content: &'a [u8] },

    Rename { source: PathBuf, dest: PathBuf },

    /// Recursive for directories
    Delete { path: PathBuf },
}

impl FileSystemOperation<'_> {
    /// Get operation name for logging
    #[must_use]
    pub const fn operation_name(&self) -> &'static str {
        match self {
            Self::CreateFile { .. } => "create_file",

            Self::CreateDirectory { .. } => "create_directory",

            Self::Write { .. } => "write",

            Self::Rename { .. } => "rename",

            Self::Delete { .. } => "delete",
        }
    }

    /// Get primary path for logging
    #[must_use]
    pub fn primary_path(&self) -> &Path {
        match self {
            Self::CreateFile { path }
            | Self::CreateDirectory { path }
            | Self::Write { path, .. }
            | Self::Rename { source: path, .. }
            | Self::Delete { path } => path,
        }
    }

    /// Runs the operation to completion on the calling thread.
    pub fn execute(&self) -> SessionResult<()> {
        debug!(
            operation = self.operation_name(),
            path = %self.primary_path().display(),
            "Executing file system operation"
        );

        match self {
            Self::CreateFile { path } => create_file(path),

            Self::CreateDirectory { path } => create_dir(path),

            Self::Write { path, content } => write_file(path, content),

            Self::Rename { source, dest } => rename(source, dest),

            Self::Delete { path } => delete(path),
        }
    }
}

impl fmt::Display for FileSystemOperation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename { source, dest } => {
                write!(f, "rename {} -> {}", source.display(), dest.display())
            }

            other => write!(f, "{} {}", other.operation_name(), other.primary_path().display()),
        }
    }
}

/// Checks a user-supplied entry name before it is joined onto a directory.
pub fn validate_name(name: &str) -> SessionResult<&str> {
    if name.trim().is_empty() {
        return Err(SessionError::EmptyName);
    }

    if name == "." || name == ".." {
        return Err(SessionError::invalid_name(name, "reserved name"));
    }

    if name.contains('/') || name.contains(MAIN_SEPARATOR) || name.contains('\0') {
        return Err(SessionError::invalid_name(name, "must not contain a path separator"));
    }

    Ok(name)
}

/// Absolute form of `path` with `.` and `..` resolved lexically. Symlinks
/// are not followed, so `link/..` is the folder containing `link`.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let absolute: PathBuf = path::absolute(path)?;
    let mut normalized = PathBuf::new();

    for component in absolute.components() {
        match component {
            Component::CurDir => {}

            // popping past the root is a no-op, as in a shell
            Component::ParentDir => {
                normalized.pop();
            }

            other => normalized.push(other),
        }
    }

    Ok(normalized)
}

/// Reads a whole text file, refusing anything above `limit` bytes.
#[instrument(level = "debug", fields(path = %path.display(), size_bytes))]
pub fn load_text(path: &Path, limit: u64) -> SessionResult<Vec<u8>> {
    let meta: Metadata = regular_file_metadata(path)?;

    Span::current().record("size_bytes", meta.len());

    if meta.len() > limit {
        return Err(SessionError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            limit,
        });
    }

    fs::read(path).map_err(|e| SessionError::cannot_open(path, e))
}

/// Metadata of `path`, which must be a regular file (symlinks followed).
pub fn regular_file_metadata(path: &Path) -> SessionResult<Metadata> {
    let meta: Metadata = fs::metadata(path).map_err(|e| SessionError::cannot_open(path, e))?;

    if meta.is_file() {
        Ok(meta)
    } else {
        Err(SessionError::cannot_open(
            path,
            io::Error::new(IoErrorKind::InvalidInput, "not a regular file"),
        ))
    }
}

/// `symlink_metadata` succeeds for dangling links too, so this also
/// catches names a plain `exists()` would miss.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[instrument(name = "create_file_operation", level = "info", fields(path = %path.display()))]
fn create_file(path: &Path) -> SessionResult<()> {
    if entry_exists(path) {
        return Err(SessionError::already_exists(path, EntryKind::File));
    }

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            IoErrorKind::AlreadyExists => SessionError::already_exists(path, EntryKind::File),

            _ => SessionError::CreateFailed {
                path: path.to_path_buf(),
                kind: EntryKind::File,
                source: e,
            },
        })?;

    info!(path = %path.display(), "File created successfully");
    Ok(())
}

#[instrument(name = "create_directory_operation", level = "info", fields(path = %path.display()))]
fn create_dir(path: &Path) -> SessionResult<()> {
    if entry_exists(path) {
        return Err(SessionError::already_exists(path, EntryKind::Folder));
    }

    fs::create_dir(path).map_err(|e| match e.kind() {
        IoErrorKind::AlreadyExists => SessionError::already_exists(path, EntryKind::Folder),

        _ => SessionError::CreateFailed {
            path: path.to_path_buf(),
            kind: EntryKind::Folder,
            source: e,
        },
    })?;

    info!(path = %path.display(), "Directory created successfully");
    Ok(())
}

#[instrument(
    name = "write_operation",
    level = "info",
    fields(path = %path.display(), bytes = content.len()),
    skip(content)
)]
fn write_file(path: &Path, content: &[u8]) -> SessionResult<()> {
    fs::write(path, content).map_err(|e| SessionError::cannot_save(path, e))?;

    info!(path = %path.display(), "File saved successfully");
    Ok(())
}

#[instrument(
    name = "rename_operation",
    level = "info",
    fields(source = %source.display(), destination = %dest.display())
)]
fn rename(source: &Path, dest: &Path) -> SessionResult<()> {
    if entry_exists(dest) {
        let is_dir: bool = source.is_dir();
        return Err(SessionError::already_exists(dest, EntryKind::from_is_dir(is_dir)));
    }

    fs::rename(source, dest).map_err(|e| SessionError::RenameFailed {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: e,
    })?;

    info!(
        source = %source.display(),
        destination = %dest.display(),
        "Rename completed successfully"
    );
    Ok(())
}

#[instrument(
    name = "delete_operation",
    level = "info",
    fields(path = %path.display(), file_type)
)]
fn delete(path: &Path) -> SessionResult<()> {
    let meta: Metadata =
        fs::symlink_metadata(path).map_err(|e| SessionError::DeleteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let result: io::Result<()> = if meta.is_dir() {
        Span::current().record("file_type", "directory");
        fs::remove_dir_all(path)
    } else {
        Span::current().record("file_type", "file");
        fs::remove_file(path)
    };

    result.map_err(|e| SessionError::DeleteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(path = %path.display(), "Deleted successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_create_file_operation() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("new_file.txt");

        let op = FileSystemOperation::CreateFile {
            path: file_path.clone(),
        };
        assert_eq!(op.operation_name(), "create_file");
        op.execute().unwrap();
        assert!(file_path.is_file());

        let err = op.execute().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_create_directory_operation() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path().join("new_dir");

        FileSystemOperation::CreateDirectory {
            path: dir_path.clone(),
        }
        .execute()
        .unwrap();
        assert!(dir_path.is_dir());

        // a file may not shadow an existing folder either
        let err = FileSystemOperation::CreateFile { path: dir_path }
            .execute()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_rename_refuses_existing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let err = FileSystemOperation::Rename {
            source: a.clone(),
            dest: b.clone(),
        }
        .execute()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&b).unwrap(), "b");
    }

    #[test]
    fn test_rename_missing_source_exposes_os_error() {
        let temp_dir = TempDir::new().unwrap();

        let err = FileSystemOperation::Rename {
            source: temp_dir.path().join("ghost"),
            dest: temp_dir.path().join("other"),
        }
        .execute()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenameFailed);
        assert_eq!(
            err.io_source().map(io::Error::kind),
            Some(IoErrorKind::NotFound)
        );
    }

    #[test]
    fn test_delete_is_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let tree = temp_dir.path().join("tree");
        fs::create_dir_all(tree.join("inner")).unwrap();
        fs::write(tree.join("inner").join("f.txt"), "x").unwrap();

        FileSystemOperation::Delete { path: tree.clone() }
            .execute()
            .unwrap();
        assert!(!tree.exists());

        let err = FileSystemOperation::Delete { path: tree }
            .execute()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeleteFailed);
    }

    #[test]
    fn test_load_text_limits() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, "hello").unwrap();

        assert_eq!(load_text(&path, 5).unwrap(), b"hello");
        assert_eq!(load_text(&path, 4).unwrap_err().kind(), ErrorKind::FileTooLarge);
        assert_eq!(
            load_text(temp_dir.path(), 5).unwrap_err().kind(),
            ErrorKind::CannotOpen
        );
        assert_eq!(
            load_text(&temp_dir.path().join("missing.txt"), 5)
                .unwrap_err()
                .kind(),
            ErrorKind::CannotOpen
        );
    }

    #[test]
    fn test_absolute_path_resolves_dots() {
        assert_eq!(
            absolute_path(Path::new("/tmp/d/sub/..")).unwrap(),
            PathBuf::from("/tmp/d")
        );
        assert_eq!(
            absolute_path(Path::new("/tmp/./d/../e/")).unwrap(),
            PathBuf::from("/tmp/e")
        );
        assert_eq!(absolute_path(Path::new("/..")).unwrap(), PathBuf::from("/"));
        assert!(absolute_path(Path::new("rel")).unwrap().is_absolute());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("notes.txt").is_ok());
        assert_eq!(validate_name("   ").unwrap_err().kind(), ErrorKind::EmptyName);
        assert_eq!(validate_name("").unwrap_err().kind(), ErrorKind::EmptyName);
        assert_eq!(validate_name("..").unwrap_err().kind(), ErrorKind::InvalidName);
        assert_eq!(validate_name("a/b").unwrap_err().kind(), ErrorKind::InvalidName);
    }
}
