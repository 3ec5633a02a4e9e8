use std::path::PathBuf;

use thiserror::Error;

/// Errors while resolving the product image. The session treats all of
/// them as "render the image layer empty".
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Failed to read image file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image loader stopped before finishing")]
    Canceled,
}

/// Errors reported to the caller of an export. None of them touch the layer model.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("The editor session is closed")]
    SessionClosed,

    #[error("The product image is still loading")]
    ImagePending,

    #[error("An export is already running")]
    InProgress,

    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export worker stopped before finishing")]
    Canceled,
}

/// Failures of the layout suggestion call. They are logged and shown as
/// "no suggestions"; editing continues regardless.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("Suggestion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Suggestion response was not usable: {0}")]
    Malformed(String),

    #[error("Suggestion worker stopped before answering")]
    Canceled,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
