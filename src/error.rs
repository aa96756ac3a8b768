//! Error type shared by the assembly, rendering and output stages.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[cfg(feature = "bookmarks")]
use crate::bookmarks::BookmarkError;
use crate::shading::ShadingError;

/// Errors that can occur while assembling, rendering or saving the estimate.
#[derive(Debug)]
pub enum EstimateError {
    /// No usable font family could be loaded.
    FontLoad(genpdf::error::Error),
    /// `genpdf` failed to lay out or serialize the document.
    Render(genpdf::error::Error),
    /// The document model is internally inconsistent.
    Layout(String),
    /// A cell fill color could not be parsed.
    Shading(ShadingError),
    /// Writing the rendered document failed.
    Io {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// Section outlines could not be embedded into the rendered PDF.
    #[cfg(feature = "bookmarks")]
    Bookmarks(BookmarkError),
}

impl EstimateError {
    pub(crate) fn layout(message: impl Into<String>) -> Self {
        Self::Layout(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ShadingError> for EstimateError {
    fn from(err: ShadingError) -> Self {
        Self::Shading(err)
    }
}

#[cfg(feature = "bookmarks")]
impl From<BookmarkError> for EstimateError {
    fn from(err: BookmarkError) -> Self {
        Self::Bookmarks(err)
    }
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(_) => write!(f, "Failed to load a Korean font family"),
            Self::Render(_) => write!(f, "Failed to render the estimate PDF"),
            Self::Layout(message) => write!(f, "Invalid document layout: {message}"),
            Self::Shading(err) => write!(f, "{err}"),
            Self::Io { path, .. } => write!(f, "Failed to write {}", path.display()),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(_) => write!(f, "Failed to add section bookmarks"),
        }
    }
}

impl std::error::Error for EstimateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Layout(_) | Self::Shading(_) => None,
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EstimateError>;
