//! ``src/fs/dir_scanner.rs``
//!
//! # `Directory Scanner`: Synchronous Filesystem Listing
//!
//! Lists a directory into `DirectoryEntry` rows. Read-only, no caching: the
//! explorer panel calls it again on every navigation.

use std::cmp::Ordering;
use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::fs::object_info::DirectoryEntry;

/// Lists `path`. A missing or non-directory path is "nothing to show" and
/// yields an empty list. Entries whose metadata cannot be read are skipped.
/// No ordering is guaranteed; see [`sort_entries`].
#[instrument(level = "debug", fields(path = %path.display()))]
pub fn list_directory(path: &Path, show_hidden: bool) -> Vec<DirectoryEntry> {
    let start_time: Instant = Instant::now();

    let read_dir: ReadDir = match fs::read_dir(path) {
        Ok(read_dir) => read_dir,

        Err(e) => {
            debug!(error = %e, "Directory not listable, showing nothing");
            return Vec::new();
        }
    };

    let mut entries: Vec<DirectoryEntry> = Vec::new();

    for entry_result in read_dir {
        let entry_path: PathBuf = match entry_result {
            Ok(entry) => entry.path(),

            Err(e) => {
                debug!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        if !show_hidden && is_hidden(&entry_path) {
            continue;
        }

        match DirectoryEntry::from_path(&entry_path) {
            Ok(Some(info)) => entries.push(info),

            Ok(None) => {}

            Err(e) => {
                // Log the error but continue processing other entries
                debug!("Failed to read metadata for {:?}: {}", entry_path, e);
            }
        }
    }

    let duration: Duration = start_time.elapsed();
    debug!(
        marker = "DIRECTORY_LISTED",
        entries = entries.len(),
        "Directory listed in {:?}",
        duration
    );

    entries
}

/// Directories first, then by name.
pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a: &DirectoryEntry, b: &DirectoryEntry| -> Ordering {
        if a.is_directory && !b.is_directory {
            Ordering::Less
        } else if !a.is_directory && b.is_directory {
            Ordering::Greater
        } else {
            a.name.cmp(&b.name)
        }
    });
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name: &str| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::file_kind::FileKind;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_directory() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path();

        File::create(path.join("a.txt"))
            .unwrap()
            .write_all(&[b'x'; 1536])
            .unwrap();
        File::create(path.join("img.png")).unwrap();
        File::create(path.join(".hidden")).unwrap();
        fs::create_dir(path.join("subdir")).unwrap();

        temp_dir
    }

    #[test]
    fn lists_files_and_directories() {
        let temp_dir = create_test_directory();
        let mut entries = list_directory(temp_dir.path(), true);
        sort_entries(&mut entries);

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].name, "subdir");
        assert!(entries[0].is_directory);
        assert_eq!(entries[0].formatted_size, "[D]");
        assert_eq!(entries[0].size, None);

        let a = entries.iter().find(|e| e.name == "a.txt").unwrap();
        assert_eq!(a.formatted_size, "1.50 KB");
        assert_eq!(a.file_kind(), FileKind::Text);
        assert_eq!(a.label(), "a.txt (1.50 KB)");

        let img = entries.iter().find(|e| e.name == "img.png").unwrap();
        assert_eq!(img.file_kind(), FileKind::Image);
    }

    #[test]
    fn hides_dot_files_when_asked() {
        let temp_dir = create_test_directory();
        let entries = list_directory(temp_dir.path(), false);

        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| !e.name.starts_with('.')));
    }

    #[test]
    fn missing_or_file_path_is_empty() {
        let temp_dir = create_test_directory();

        assert!(list_directory(&temp_dir.path().join("nope"), true).is_empty());
        assert!(list_directory(&temp_dir.path().join("a.txt"), true).is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn skips_names_that_are_not_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("ok.txt")).unwrap();
        File::create(temp_dir.path().join(OsStr::from_bytes(b"bad\xff.txt"))).unwrap();

        let entries = list_directory(temp_dir.path(), true);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "ok.txt");
    }

    #[test]
    fn two_entry_scenario() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.txt")).unwrap();
        File::create(temp_dir.path().join("img.png")).unwrap();

        assert_eq!(list_directory(temp_dir.path(), true).len(), 2);
    }
}
