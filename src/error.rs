//! Crate-level error types.

use std::fmt;
use std::path::PathBuf;

use crate::gpu::GpuContextError;

/// Errors produced by the g3dview crate.
///
/// Every variant is recoverable at the viewer-state boundary: a failed
/// transition leaves prior state intact and is reported to the shell.
#[derive(Debug)]
pub enum ViewError {
    /// File or texture read failure.
    Io(std::io::Error),
    /// Malformed model or options document.
    Format(String),
    /// Folder missing or inaccessible.
    NotFound(PathBuf),
    /// Animation handle does not belong to the loaded model.
    InvalidSelection(String),
    /// GPU context initialization failure.
    Gpu(GpuContextError),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::NotFound(path) => {
                write!(f, "folder not found: {}", path.display())
            }
            Self::InvalidSelection(msg) => {
                write!(f, "invalid selection: {msg}")
            }
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Gpu(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ViewError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<GpuContextError> for ViewError {
    fn from(e: GpuContextError) -> Self {
        Self::Gpu(e)
    }
}
