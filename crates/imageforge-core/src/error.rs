//! Error types for editor operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Message reported by [`crate::ImageEditor::error_message`] before any
/// operation has failed.
pub const UNKNOWN_ERROR: &str = "An unknown error has occurred";

/// Errors that can occur while loading or saving an image.
///
/// Geometry and color operations never fail; only the two ends of an edit
/// chain touch the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The input could be decoded neither as a file path nor as a blob.
    #[error("Could not load image '{input}' for editing")]
    Load {
        /// Printable rendering of the rejected input.
        input: String,
    },

    /// Creating the parent directory, encoding or writing the file failed.
    #[error("Could not save image '{}'", path.display())]
    Save {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying cause, kept for logging.
        reason: String,
    },

    /// Encoding to an in-memory buffer failed.
    #[error("Could not encode image: {reason}")]
    Encode {
        /// Underlying cause.
        reason: String,
    },
}

impl EditError {
    pub(crate) fn load(input: &[u8]) -> Self {
        EditError::Load {
            input: describe_input(input),
        }
    }

    pub(crate) fn save(path: &Path, reason: impl ToString) -> Self {
        EditError::Save {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn encode(reason: impl ToString) -> Self {
        EditError::Encode {
            reason: reason.to_string(),
        }
    }
}

/// Render raw editor input for an error message.
///
/// Paths and other UTF-8 input are shown verbatim; binary blobs only by size.
fn describe_input(input: &[u8]) -> String {
    match std::str::from_utf8(input) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<{} bytes>", input.len()),
    }
}
