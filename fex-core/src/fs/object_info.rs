//! `src/fs/object_info.rs`
//! ============================================================
//! Transient listing rows handed to the presentation layer.
//!
//! A `DirectoryEntry` is rebuilt on every listing and never
//! persisted. Directories carry the `[D]` marker instead of a
//! formatted size.

// ------------------------------------------------------------
// Standard-library imports
// ------------------------------------------------------------
use std::ffi::OsStr;
use std::fs::{self, Metadata};
use std::path::Path;

// ------------------------------------------------------------
// Third-party crate imports
// ------------------------------------------------------------
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ------------------------------------------------------------
// Local-crate imports
// ------------------------------------------------------------
use crate::model::file_kind::{self, FileKind};
use crate::util::humanize::{DIRECTORY_MARKER, format_size};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    // Entry name relative to the listed directory
    pub name: CompactString,

    // Lower-case extension (files only)
    pub extension: Option<CompactString>,

    // Byte length, `None` for directories
    pub size: Option<u64>,

    // Human-readable size or the directory marker
    pub formatted_size: String,

    pub is_directory: bool,
}

impl DirectoryEntry {
    /// Builds an entry from a path, following symlinks. Anything that is
    /// neither a regular file nor a directory, or whose name is not UTF-8,
    /// yields `None`.
    pub fn from_path(path: &Path) -> std::io::Result<Option<Self>> {
        let meta: Metadata = fs::metadata(path)?;

        Ok(Self::from_meta(path, &meta))
    }

    fn from_meta(path: &Path, meta: &Metadata) -> Option<Self> {
        // a name that is not UTF-8 could not be navigated to or selected
        let Some(name) = path.file_name().and_then(OsStr::to_str) else {
            debug!(path = ?path, "Skipping entry with a non UTF-8 name");
            return None;
        };
        let name = CompactString::new(name);

        if meta.is_dir() {
            return Some(Self {
                name,
                extension: None,
                size: None,
                formatted_size: DIRECTORY_MARKER.to_string(),
                is_directory: true,
            });
        }

        if !meta.is_file() {
            return None;
        }

        let extension: Option<CompactString> = path
            .extension()
            .and_then(OsStr::to_str)
            .map(|s: &str| -> CompactString { CompactString::new(s.to_lowercase()) });

        Some(Self {
            name,
            extension,
            size: Some(meta.len()),
            formatted_size: format_size(meta.len()),
            is_directory: false,
        })
    }

    /// Load strategy for this entry; directories are `Unsupported`.
    #[must_use]
    pub fn file_kind(&self) -> FileKind {
        match (&self.extension, self.is_directory) {
            (Some(ext), false) => file_kind::classify(ext),
            _ => FileKind::Unsupported,
        }
    }

    /// Label as the explorer panel shows it, e.g. `notes.txt (1.50 KB)`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_directory {
            self.name.to_string()
        } else {
            format!("{} ({})", self.name, self.formatted_size)
        }
    }
}
