//! ``src/model/image_slot.rs``
//! ============================================================================
//! # `ImageSlot`: the one decoded image a session may hold
//!
//! Decoding itself is delegated to an [`ImageDecoder`]; the slot only owns
//! the result. A previous image is released before a new one replaces it,
//! on every selection or directory change, and once more at teardown.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{SessionError, SessionResult};

/// A decoded, displayable image. Dropping it releases its pixels.
pub trait ImageHandle: fmt::Debug {
    fn dimensions(&self) -> (u32, u32);
}

/// Turns an image file into a handle. Errors are human-readable reasons.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<Box<dyn ImageHandle>, String>;
}

/// Default decoder backed by the `image` crate (jpg, png, bmp).
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

#[derive(Debug)]
struct RgbaPixels(image::RgbaImage);

impl ImageHandle for RgbaPixels {
    fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<Box<dyn ImageHandle>, String> {
        let img = image::open(path).map_err(|e| e.to_string())?;

        Ok(Box::new(RgbaPixels(img.to_rgba8())))
    }
}

#[derive(Debug)]
struct LoadedImage {
    path: PathBuf,
    handle: Box<dyn ImageHandle>,
}

pub struct ImageSlot {
    decoder: Box<dyn ImageDecoder>,
    current: Option<LoadedImage>,

    /// Last decode failure, kept so the preview can explain itself
    failure: Option<(PathBuf, String)>,
}

impl fmt::Debug for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSlot")
            .field("current", &self.current)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

impl Default for ImageSlot {
    fn default() -> Self {
        Self::new(Box::new(ImageCrateDecoder))
    }
}

impl ImageSlot {
    #[must_use]
    pub fn new(decoder: Box<dyn ImageDecoder>) -> Self {
        Self {
            decoder,
            current: None,
            failure: None,
        }
    }

    /// Decodes `path` into the slot unless it is already there. A failure
    /// leaves the slot empty and remembers the reason.
    pub fn load(&mut self, path: &Path) -> SessionResult<(u32, u32)> {
        if let Some(loaded) = self.current.as_ref().filter(|l| l.path == path) {
            return Ok(loaded.handle.dimensions());
        }

        self.release();

        match self.decoder.decode(path) {
            Ok(handle) => {
                let dims: (u32, u32) = handle.dimensions();
                debug!(path = %path.display(), width = dims.0, height = dims.1, "Image decoded");

                self.current = Some(LoadedImage {
                    path: path.to_path_buf(),
                    handle,
                });

                Ok(dims)
            }

            Err(reason) => {
                warn!(path = %path.display(), %reason, "Image decode failed, preview degraded");

                self.failure = Some((path.to_path_buf(), reason.clone()));

                Err(SessionError::ImageDecodeFailed {
                    path: path.to_path_buf(),
                    reason,
                })
            }
        }
    }

    /// Drops the decoded image, if any, and forgets any decode failure.
    pub fn release(&mut self) {
        if let Some(old) = self.current.take() {
            debug!(path = %old.path.display(), "Released image preview");
        }

        self.failure = None;
    }

    #[must_use]
    pub fn dimensions_for(&self, path: &Path) -> Option<(u32, u32)> {
        self.current
            .as_ref()
            .filter(|l| l.path == path)
            .map(|l| l.handle.dimensions())
    }

    #[must_use]
    pub fn failure_for(&self, path: &Path) -> Option<&str> {
        self.failure
            .as_ref()
            .filter(|(p, _)| p == path)
            .map(|(_, reason)| reason.as_str())
    }

    #[cfg(test)]
    pub(crate) const fn is_holding(&self) -> bool {
        self.current.is_some()
    }
}

impl Drop for ImageSlot {
    fn drop(&mut self) {
        self.release();
    }
}
