//! Error types for presentation-to-HTML translation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while translating an exploded presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// The package root is missing, unreadable, or holds no slide parts.
    /// Fatal to the whole translation run.
    #[error("Package error: {0}")]
    PackageError(String),

    /// One slide's markup could not be parsed at the document level.
    /// Only that slide is dropped; the run continues.
    #[error("Slide {ordinal} ({part}) could not be parsed: {message}")]
    MarkupError {
        /// 1-based position of the slide in discovery order.
        ordinal: usize,
        /// Part name, e.g. `slide3`.
        part: String,
        /// What went wrong.
        message: String,
    },

    /// Writing the self-contained bundle failed.
    #[error("Packaging error: {0}")]
    PackagingError(String),

    /// XML syntax error from the underlying reader.
    #[error("XML parsing error: {0}")]
    XmlError(String),
}
