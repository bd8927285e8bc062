pub mod error;

pub mod config;

pub mod controller {
    pub mod actions;
    pub use actions::{Command, Outcome, Preview, Target, Transition};

    pub mod session_manager;
    pub use session_manager::SessionManager;
}

pub mod model {
    pub mod file_kind;
    pub use file_kind::{FileKind, Syntax};

    pub mod image_slot;
    pub use image_slot::{ImageCrateDecoder, ImageDecoder, ImageHandle, ImageSlot};

    pub mod session;
    pub use session::{FileState, PendingTarget, Session};
}

pub mod fs {
    pub mod dir_scanner;

    pub mod object_info;
}

pub mod operators {
    pub mod file_system_operator;
}

pub mod logging;
pub use logging::Logger;

pub mod util {
    pub mod humanize;
}

pub use config::Config;
pub use controller::SessionManager;
pub use error::{ErrorKind, SessionError, SessionResult};
