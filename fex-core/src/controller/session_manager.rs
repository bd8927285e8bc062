//! ``src/controller/session_manager.rs``
//! ============================================================================
//! # `SessionManager`: every change to the session goes through here
//!
//! Owns the [`Session`] and the [`ImageSlot`], and routes each filesystem
//! mutation through the file system operator. The unsaved-changes guard
//! lives here: while the buffer is dirty, directory changes and opening a
//! different file are parked as the session's pending target and reported as
//! [`Transition::ConfirmationRequired`]; the presentation layer asks the user
//! and answers with [`SessionManager::resolve_pending_open`].
//!
//! Failures never leave the session half-updated: every operation checks and
//! performs its filesystem work before touching session state.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::controller::actions::{
    Command, ExitChoice, ExitDecision, ExitStatus, Outcome, PendingChoice, Preview, SaveOutcome,
    Target, Transition,
};
use crate::error::{SessionError, SessionResult};
use crate::fs::dir_scanner;
use crate::fs::object_info::DirectoryEntry;
use crate::model::file_kind::{self, FileKind, Syntax};
use crate::model::image_slot::{ImageDecoder, ImageSlot};
use crate::model::session::{FileState, PendingTarget, Session};
use crate::operators::file_system_operator::{self as fs_op, FileSystemOperation};

#[derive(Debug)]
pub struct SessionManager {
    session: Session,
    images: ImageSlot,
    max_text_bytes: u64,
    show_hidden: bool,
    fallback_directory: Option<PathBuf>,
}

impl SessionManager {
    /// Empty session using the `image` crate for previews.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_images(config, ImageSlot::default())
    }

    #[must_use]
    pub fn with_decoder(config: &Config, decoder: Box<dyn ImageDecoder>) -> Self {
        Self::with_images(config, ImageSlot::new(decoder))
    }

    fn with_images(config: &Config, images: ImageSlot) -> Self {
        Self {
            session: Session::new(),
            images,
            max_text_bytes: config.max_text_bytes,
            show_hidden: config.show_hidden,
            fallback_directory: config.fallback_directory.clone(),
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Single entry point for the presentation layer. Errors are traced
    /// before being returned.
    pub fn dispatch(&mut self, command: Command) -> SessionResult<Outcome> {
        debug!(command = command.name(), "Dispatching command");

        let result: SessionResult<Outcome> = match command {
            Command::OpenDirectory(path) => self.open_directory(&path).map(Outcome::Transition),

            Command::NavigateInto(name) => self.navigate_into(&name).map(Outcome::Transition),

            Command::NavigateUp => self.navigate_up().map(Outcome::Transition),

            Command::SelectFile(path) => self.select_file(&path).map(Outcome::Transition),

            Command::ResolvePendingOpen(choice) => {
                self.resolve_pending_open(choice).map(Outcome::Transition)
            }

            Command::EditContent(bytes) => self
                .edit_content(bytes)
                .map(|changed: bool| Outcome::Edited { changed }),

            Command::Save => self.save().map(Outcome::Saved),

            Command::CreateFile(name) => self.create_file(&name).map(Outcome::Transition),

            Command::CreateFolder(name) => self.create_folder(&name).map(Outcome::Transition),

            Command::Rename { target, new_name } => {
                self.rename(target, &new_name).map(Outcome::Renamed)
            }

            Command::Delete(target) => self.delete(target).map(|()| Outcome::Deleted),

            Command::RequestExit => Ok(Outcome::Exit(self.request_exit())),

            Command::ResolveExit(choice) => self.resolve_exit(choice).map(Outcome::ExitDecision),

            Command::LoadImagePreview => Ok(Outcome::Preview(self.load_image_preview())),
        };

        result.map_err(SessionError::trace)
    }

    // ------------------------------------------------------------
    // Read side for the presentation layer
    // ------------------------------------------------------------

    /// Listing of the current directory; empty when no folder is open.
    #[must_use]
    pub fn list_current(&self) -> Vec<DirectoryEntry> {
        self.session
            .current_directory()
            .map(|dir: &Path| dir_scanner::list_directory(dir, self.show_hidden))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn preview(&self) -> Preview {
        match self.session.file_state() {
            FileState::Empty => Preview::Nothing,

            FileState::Loaded { .. } => Preview::Text,

            FileState::Selected {
                path,
                kind: FileKind::Image,
            } => {
                if let Some((width, height)) = self.images.dimensions_for(path) {
                    Preview::Image { width, height }
                } else if let Some(reason) = self.images.failure_for(path) {
                    Preview::Unsupported {
                        reason: Some(reason.to_string()),
                    }
                } else {
                    Preview::PendingImage
                }
            }

            FileState::Selected { .. } => Preview::Unsupported { reason: None },
        }
    }

    /// Syntax definition for the loaded text file.
    #[must_use]
    pub fn syntax(&self) -> Option<Syntax> {
        if !self.session.is_loaded() {
            return None;
        }

        self.session
            .selected_entry()
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .map_or(Some(Syntax::CPlusPlus), file_kind::syntax_for)
    }

    // ------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------

    #[instrument(level = "info", skip(self), fields(path = %path.display()))]
    pub fn open_directory(&mut self, path: &Path) -> SessionResult<Transition> {
        let target: PathBuf = Self::resolve_directory(path)?;

        Ok(self.guard_directory_change(target))
    }

    #[instrument(level = "info", skip(self))]
    pub fn navigate_into(&mut self, name: &str) -> SessionResult<Transition> {
        let current: &Path = self.require_directory()?;
        let target: PathBuf = Self::resolve_directory(&current.join(name))?;

        Ok(self.guard_directory_change(target))
    }

    #[instrument(level = "info", skip(self))]
    pub fn navigate_up(&mut self) -> SessionResult<Transition> {
        let current: &Path = self.require_directory()?;
        let parent: &Path = current
            .parent()
            .ok_or_else(|| SessionError::invalid_directory(current))?;
        let target: PathBuf = Self::resolve_directory(parent)?;

        Ok(self.guard_directory_change(target))
    }

    // ------------------------------------------------------------
    // File session
    // ------------------------------------------------------------

    /// Relative paths are taken from the current directory when one is open.
    #[instrument(level = "info", skip(self), fields(path = %path.display()))]
    pub fn select_file(&mut self, path: &Path) -> SessionResult<Transition> {
        let joined: PathBuf = match self.session.current_directory() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        let path: PathBuf =
            fs_op::absolute_path(&joined).map_err(|e| SessionError::cannot_open(&joined, e))?;

        if self.session.is_dirty() {
            if self.session.selected_entry() == Some(path.as_path()) {
                return Ok(Transition::Unchanged);
            }

            info!(pending = %path.display(), "Unsaved changes, open deferred");
            self.session.set_pending(PendingTarget::OpenFile(path));

            return Ok(Transition::ConfirmationRequired);
        }

        self.load_file(path)?;

        Ok(Transition::Applied)
    }

    #[instrument(level = "info", skip(self))]
    pub fn resolve_pending_open(&mut self, choice: PendingChoice) -> SessionResult<Transition> {
        let Some(target) = self.session.pending_target().cloned() else {
            return Ok(Transition::Unchanged);
        };

        match choice {
            PendingChoice::Cancel => {
                self.session.clear_pending();
                info!("Pending open cancelled");

                return Ok(Transition::Unchanged);
            }

            PendingChoice::Save => self.write_buffer()?,

            PendingChoice::Discard => {
                info!(path = ?self.session.selected_entry(), "Discarding unsaved changes");
            }
        }

        // the prompt is answered even if the deferred open fails below
        self.session.clear_pending();

        match target {
            PendingTarget::OpenFile(path) => self.load_file(path)?,

            PendingTarget::OpenDirectory(path) => {
                let target: PathBuf = Self::resolve_directory(&path)?;
                self.apply_directory(Some(target));
            }
        }

        Ok(Transition::Applied)
    }

    /// Replaces the edit buffer; returns whether the content changed.
    #[instrument(level = "debug", skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn edit_content(&mut self, bytes: Vec<u8>) -> SessionResult<bool> {
        self.session.edit(bytes).ok_or(SessionError::NothingLoaded)
    }

    #[instrument(level = "info", skip(self))]
    pub fn save(&mut self) -> SessionResult<SaveOutcome> {
        match self.session.file_state() {
            FileState::Loaded { dirty: false, .. } => Ok(SaveOutcome::AlreadyClean),

            FileState::Loaded { dirty: true, .. } => {
                self.write_buffer()?;

                Ok(SaveOutcome::Saved)
            }

            _ => Ok(SaveOutcome::NothingToSave),
        }
    }

    // ------------------------------------------------------------
    // Create / rename / delete
    // ------------------------------------------------------------

    /// Creates an empty file in the current directory and opens it.
    #[instrument(level = "info", skip(self))]
    pub fn create_file(&mut self, name: &str) -> SessionResult<Transition> {
        let path: PathBuf = self.require_directory()?.join(fs_op::validate_name(name)?);

        FileSystemOperation::CreateFile { path: path.clone() }.execute()?;

        if self.session.is_dirty() {
            self.session.set_pending(PendingTarget::OpenFile(path));

            return Ok(Transition::ConfirmationRequired);
        }

        self.images.release();
        self.session.select_text(path, Vec::new());

        Ok(Transition::Applied)
    }

    /// Creates a folder in the current directory and enters it.
    #[instrument(level = "info", skip(self))]
    pub fn create_folder(&mut self, name: &str) -> SessionResult<Transition> {
        let path: PathBuf = self.require_directory()?.join(fs_op::validate_name(name)?);

        FileSystemOperation::CreateDirectory { path: path.clone() }.execute()?;

        Ok(self.guard_directory_change(path))
    }

    /// Renames the selection or the current directory within its parent and
    /// returns the new path. A renamed selection is reopened from disk, so
    /// unsaved edits to it are dropped.
    #[instrument(level = "info", skip(self))]
    pub fn rename(&mut self, target: Target, new_name: &str) -> SessionResult<PathBuf> {
        let new_name: &str = fs_op::validate_name(new_name)?;

        if target == Target::CurrentDirectory {
            self.refuse_if_dirty()?;
        }

        let source: PathBuf = self.target_path(target, "rename")?;
        let parent: &Path = source
            .parent()
            .ok_or_else(|| SessionError::invalid_directory(&source))?;
        let dest: PathBuf = parent.join(new_name);

        FileSystemOperation::Rename {
            source: source.clone(),
            dest: dest.clone(),
        }
        .execute()?;

        match target {
            Target::SelectedEntry => {
                self.images.release();
                self.session.clear_selection();
                self.session.clear_pending();

                if let Err(e) = self.load_file(dest.clone()) {
                    warn!(error = %e, "Renamed file could not be reopened");
                }
            }

            Target::CurrentDirectory => self.apply_directory(Some(dest.clone())),
        }

        Ok(dest)
    }

    /// Recursively removes the selection or the current directory.
    #[instrument(level = "info", skip(self))]
    pub fn delete(&mut self, target: Target) -> SessionResult<()> {
        let path: PathBuf = self.target_path(target, "delete")?;

        if target == Target::CurrentDirectory {
            self.refuse_if_dirty()?;
        }

        FileSystemOperation::Delete { path }.execute()?;

        match target {
            Target::SelectedEntry => {
                self.images.release();
                self.session.clear_selection();
                self.session.clear_pending();
            }

            Target::CurrentDirectory => {
                let fallback: Option<PathBuf> = self.fallback_directory();
                info!(fallback = ?fallback, "Current directory deleted");

                self.apply_directory(fallback);
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------
    // Exit and preview
    // ------------------------------------------------------------

    #[must_use]
    pub const fn request_exit(&self) -> ExitStatus {
        if self.session.is_dirty() {
            ExitStatus::NeedsConfirmation
        } else {
            ExitStatus::ReadyToExit
        }
    }

    #[instrument(level = "info", skip(self))]
    pub fn resolve_exit(&mut self, choice: ExitChoice) -> SessionResult<ExitDecision> {
        match choice {
            ExitChoice::Cancel => return Ok(ExitDecision::Stay),

            ExitChoice::Save => self.write_buffer()?,

            ExitChoice::DiscardAndExit => {}
        }

        self.shutdown();

        Ok(ExitDecision::Exit)
    }

    /// Decodes the selected image into the slot. A decode failure degrades
    /// the preview to unsupported; the selection itself is kept.
    #[instrument(level = "debug", skip(self))]
    pub fn load_image_preview(&mut self) -> Preview {
        if let FileState::Selected {
            path,
            kind: FileKind::Image,
        } = self.session.file_state()
        {
            let path: PathBuf = path.clone();

            if let Err(e) = self.images.load(&path) {
                let _ = e.trace();
            }
        }

        self.preview()
    }

    /// Releases the decoded image; the session is finished after this.
    pub fn shutdown(&mut self) {
        self.images.release();
        info!("Session closed");
    }

    // ------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------

    fn resolve_directory(path: &Path) -> SessionResult<PathBuf> {
        let absolute: PathBuf =
            fs_op::absolute_path(path).map_err(|_| SessionError::invalid_directory(path))?;

        if absolute.is_dir() {
            Ok(absolute)
        } else {
            Err(SessionError::invalid_directory(absolute))
        }
    }

    fn require_directory(&self) -> SessionResult<&Path> {
        self.session
            .current_directory()
            .ok_or_else(|| SessionError::invalid_directory(PathBuf::new()))
    }

    fn target_path(&self, target: Target, operation: &'static str) -> SessionResult<PathBuf> {
        let path: Option<&Path> = match target {
            Target::SelectedEntry => self.session.selected_entry(),
            Target::CurrentDirectory => self.session.current_directory(),
        };

        path.map(Path::to_path_buf)
            .ok_or(SessionError::NothingSelected { operation })
    }

    fn refuse_if_dirty(&self) -> SessionResult<()> {
        match self.session.selected_entry() {
            Some(path) if self.session.is_dirty() => Err(SessionError::UnsavedChanges {
                path: path.to_path_buf(),
            }),

            _ => Ok(()),
        }
    }

    /// Applies a directory change, or parks it when there are unsaved edits.
    fn guard_directory_change(&mut self, target: PathBuf) -> Transition {
        if self.session.is_dirty() {
            info!(pending = %target.display(), "Unsaved changes, directory change deferred");
            self.session.set_pending(PendingTarget::OpenDirectory(target));

            return Transition::ConfirmationRequired;
        }

        self.apply_directory(Some(target));

        Transition::Applied
    }

    fn apply_directory(&mut self, path: Option<PathBuf>) {
        self.images.release();
        self.session.clear_selection();
        self.session.clear_pending();

        info!(directory = ?path, "Current directory changed");
        self.session.enter_directory(path);
    }

    /// Reads `path` according to its kind and makes it the selection. On
    /// failure the session is left exactly as it was.
    fn load_file(&mut self, path: PathBuf) -> SessionResult<()> {
        let kind: FileKind = file_kind::classify_path(&path);

        if kind == FileKind::Text {
            let content: Vec<u8> = fs_op::load_text(&path, self.max_text_bytes)?;
            self.release_image_unless(&path);

            debug!(path = %path.display(), bytes = content.len(), "Text file loaded");
            self.session.select_text(path, content);
        } else {
            fs_op::regular_file_metadata(&path)?;
            self.release_image_unless(&path);

            debug!(path = %path.display(), %kind, "File selected without buffer");
            self.session.select_without_buffer(path);
        }

        self.session.clear_pending();

        Ok(())
    }

    fn release_image_unless(&mut self, path: &Path) {
        if self.session.selected_entry() != Some(path) {
            self.images.release();
        }
    }

    fn write_buffer(&mut self) -> SessionResult<()> {
        if let FileState::Loaded { path, content, .. } = self.session.file_state() {
            FileSystemOperation::Write {
                path: path.clone(),
                content: content.as_slice(),
            }
            .execute()?;
        }

        self.session.mark_saved();

        Ok(())
    }

    fn fallback_directory(&self) -> Option<PathBuf> {
        self.fallback_directory
            .as_ref()
            .filter(|dir: &&PathBuf| dir.is_dir())
            .cloned()
            .or_else(|| env::current_dir().ok())
    }
}
