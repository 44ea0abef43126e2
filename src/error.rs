//! Error types for the unwp library.

use std::io;
use thiserror::Error;

/// Result type alias for unwp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the unwp library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The HTML fragment could not be parsed into a usable tree.
    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    /// A social embed block carries no discoverable link. Dropping it
    /// silently would lose content, so the post conversion is aborted.
    #[error("{platform} embed has no discoverable link")]
    EmbedMissingLink { platform: &'static str },

    /// XML parsing error in a WXR export file.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// The export item is missing a field the converter cannot do without.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The post date could not be parsed from either `pubDate` or
    /// `wp:post_date`.
    #[error("Unparseable post date: {0}")]
    BadDate(String),

    /// Markdown serialization error.
    #[error("Markdown serialization error: {0}")]
    Serialize(String),

    /// HTTP error while downloading an image.
    #[error("Download error for {url}: {message}")]
    Download { url: String, message: String },

    /// Malformed URL in an image reference.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}
