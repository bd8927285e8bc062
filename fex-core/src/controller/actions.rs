//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Commands the presentation layer sends to the session
//!
//! The presentation layer owns popups, input buffers and "first frame" flags.
//! Once the user confirms, it sends one fully formed [`Command`] and renders
//! whatever [`Outcome`] comes back.

use std::path::PathBuf;

/// Which path a rename or delete acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    SelectedEntry,
    CurrentDirectory,
}

/// Answer to the "save changes before opening?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingChoice {
    Save,
    Discard,
    Cancel,
}

/// Answer to the "save changes before exiting?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    Save,
    DiscardAndExit,
    Cancel,
}

/// Represents a high-level request from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenDirectory(PathBuf),

    /// Enter a child of the current directory.
    NavigateInto(String),

    NavigateUp,

    SelectFile(PathBuf),

    ResolvePendingOpen(PendingChoice),

    /// Replace the whole edit buffer.
    EditContent(Vec<u8>),

    Save,

    CreateFile(String),

    CreateFolder(String),

    Rename { target: Target, new_name: String },

    Delete(Target),

    RequestExit,

    ResolveExit(ExitChoice),

    /// Decode the selected image for display.
    LoadImagePreview,
}

impl Command {
    /// Short name for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenDirectory(_) => "open_directory",
            Self::NavigateInto(_) => "navigate_into",
            Self::NavigateUp => "navigate_up",
            Self::SelectFile(_) => "select_file",
            Self::ResolvePendingOpen(_) => "resolve_pending_open",
            Self::EditContent(_) => "edit_content",
            Self::Save => "save",
            Self::CreateFile(_) => "create_file",
            Self::CreateFolder(_) => "create_folder",
            Self::Rename { .. } => "rename",
            Self::Delete(_) => "delete",
            Self::RequestExit => "request_exit",
            Self::ResolveExit(_) => "resolve_exit",
            Self::LoadImagePreview => "load_image_preview",
        }
    }
}

/// Result of a navigation or open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The session now shows the requested directory or file
    Applied,

    /// Unsaved changes block the request; it is stored as the pending
    /// target until resolved
    ConfirmationRequired,

    /// Nothing to do
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadyClean,
    NothingToSave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    ReadyToExit,
    NeedsConfirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Exit,
    Stay,
}

/// What the viewer pane should render for the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Nothing,

    /// Text buffer available through the session
    Text,

    Image { width: u32, height: u32 },

    /// Image selected, not decoded yet
    PendingImage,

    /// "File format not supported for preview"; `reason` is set when an
    /// image failed to decode
    Unsupported { reason: Option<String> },
}

/// Reply to a dispatched [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Transition(Transition),
    Edited { changed: bool },
    Saved(SaveOutcome),
    Renamed(PathBuf),
    Deleted,
    Exit(ExitStatus),
    ExitDecision(ExitDecision),
    Preview(Preview),
}
