//! ``src/model/session.rs``
//! ============================================================================
//! # `Session`: open directory and open file
//!
//! The single mutable aggregate behind the explorer. The buffer and its dirty
//! bit live inside [`FileState::Loaded`], so "dirty without loaded content"
//! and "loaded without a selection" cannot be expressed. Mutators are
//! crate-private: only the session manager changes a session.

use std::path::{Path, PathBuf};

use crate::model::file_kind::{self, FileKind};

/// What is known about the selected file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FileState {
    /// Nothing selected
    #[default]
    Empty,

    /// Selected without a text buffer (images and unsupported types)
    Selected { path: PathBuf, kind: FileKind },

    /// Text file read into memory
    Loaded {
        path: PathBuf,
        content: Vec<u8>,
        dirty: bool,
    },
}

/// A request deferred until unsaved changes are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingTarget {
    OpenDirectory(PathBuf),
    OpenFile(PathBuf),
}

impl PendingTarget {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::OpenDirectory(path) | Self::OpenFile(path) => path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_directory: Option<PathBuf>,
    file: FileState,
    pending: Option<PendingTarget>,
}

impl Session {
    /// Empty session: no folder opened, nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_directory(&self) -> Option<&Path> {
        self.current_directory.as_deref()
    }

    #[must_use]
    pub fn selected_entry(&self) -> Option<&Path> {
        match &self.file {
            FileState::Empty => None,
            FileState::Selected { path, .. } | FileState::Loaded { path, .. } => Some(path),
        }
    }

    /// Classification of the selection; `None` when nothing is selected.
    #[must_use]
    pub fn selected_kind(&self) -> Option<FileKind> {
        match &self.file {
            FileState::Empty => None,
            FileState::Selected { kind, .. } => Some(*kind),
            FileState::Loaded { .. } => Some(FileKind::Text),
        }
    }

    #[must_use]
    pub fn content(&self) -> Option<&[u8]> {
        match &self.file {
            FileState::Loaded { content, .. } => Some(content),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self.file, FileState::Loaded { .. })
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        matches!(self.file, FileState::Loaded { dirty: true, .. })
    }

    #[must_use]
    pub const fn pending_target(&self) -> Option<&PendingTarget> {
        self.pending.as_ref()
    }

    #[must_use]
    pub const fn file_state(&self) -> &FileState {
        &self.file
    }

    /// Title the viewer shows: file name, with ` *` appended when dirty.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        let name = self.selected_entry()?.file_name()?.to_string_lossy();

        Some(if self.is_dirty() {
            format!("{name} *")
        } else {
            name.into_owned()
        })
    }

    // ------------------------------------------------------------
    // Crate-private mutators
    // ------------------------------------------------------------

    /// Switches directory and drops the selection.
    pub(crate) fn enter_directory(&mut self, path: Option<PathBuf>) {
        debug_assert!(!self.is_dirty(), "directory change while dirty");

        self.current_directory = path;
        self.file = FileState::Empty;
    }

    /// Replaces the selection with a freshly read text file. Only legal when
    /// clean or when the caller has resolved the unsaved changes.
    pub(crate) fn select_text(&mut self, path: PathBuf, content: Vec<u8>) {
        self.file = FileState::Loaded {
            path,
            content,
            dirty: false,
        };
    }

    pub(crate) fn select_without_buffer(&mut self, path: PathBuf) {
        let kind: FileKind = file_kind::classify_path(&path);
        self.file = FileState::Selected { path, kind };
    }

    pub(crate) fn clear_selection(&mut self) {
        self.file = FileState::Empty;
    }

    /// Replaces the buffer; returns whether anything changed. `None` when no
    /// text file is loaded.
    pub(crate) fn edit(&mut self, new_content: Vec<u8>) -> Option<bool> {
        match &mut self.file {
            FileState::Loaded { content, dirty, .. } => {
                if *content == new_content {
                    return Some(false);
                }

                *content = new_content;
                *dirty = true;

                Some(true)
            }

            _ => None,
        }
    }

    pub(crate) fn mark_saved(&mut self) {
        if let FileState::Loaded { dirty, .. } = &mut self.file {
            *dirty = false;
        }
    }

    pub(crate) fn set_pending(&mut self, target: PendingTarget) {
        self.pending = Some(target);
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(content: &str) -> Session {
        let mut session = Session::new();
        session.enter_directory(Some(PathBuf::from("/tmp/d")));
        session.select_text(PathBuf::from("/tmp/d/a.txt"), content.as_bytes().to_vec());
        session
    }

    #[test]
    fn new_session_is_empty() {
        let session = Session::new();

        assert!(session.current_directory().is_none());
        assert!(session.selected_entry().is_none());
        assert!(!session.is_loaded());
        assert!(!session.is_dirty());
        assert!(session.pending_target().is_none());
        assert!(session.title().is_none());
    }

    #[test]
    fn identical_edit_stays_clean() {
        let mut session = loaded("abc");

        assert_eq!(session.edit(b"abc".to_vec()), Some(false));
        assert!(!session.is_dirty());

        assert_eq!(session.edit(b"abcd".to_vec()), Some(true));
        assert!(session.is_dirty());
        assert_eq!(session.title().as_deref(), Some("a.txt *"));

        session.mark_saved();
        assert!(!session.is_dirty());
        assert_eq!(session.content(), Some(&b"abcd"[..]));
    }

    #[test]
    fn edit_without_text_buffer_is_refused() {
        let mut session = Session::new();
        assert_eq!(session.edit(b"x".to_vec()), None);

        session.select_without_buffer(PathBuf::from("/tmp/d/img.png"));
        assert_eq!(session.edit(b"x".to_vec()), None);
        assert_eq!(session.selected_kind(), Some(FileKind::Image));
        assert!(session.content().is_none());
    }

    #[test]
    fn clearing_selection_clears_flags() {
        let mut session = loaded("abc");
        session.edit(b"xyz".to_vec());

        session.clear_selection();
        assert!(session.selected_entry().is_none());
        assert!(!session.is_loaded());
        assert!(!session.is_dirty());
    }

    #[test]
    fn pending_target_round_trip() {
        let mut session = loaded("abc");
        session.set_pending(PendingTarget::OpenFile(PathBuf::from("/tmp/d/b.txt")));

        assert_eq!(
            session.pending_target().map(PendingTarget::path),
            Some(Path::new("/tmp/d/b.txt"))
        );
        session.clear_pending();
        assert!(session.pending_target().is_none());
    }
}
