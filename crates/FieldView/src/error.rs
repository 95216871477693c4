//! # Errors
//!
//! Failures that cross the library boundary. Image load failures are not here:
//! they are absorbed by the image cache and never reach the caller.

use thiserror::Error;

/// Errors raised by a drawing surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface cannot report its current transform, so pixel alignment is impossible.
    #[error("unable to find surface transform")]
    TransformUnavailable,
}

/// Errors that abort a render pass.
///
/// Drawing issued before the failure stays on the surface.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// The overlay contained an operation kind the interpreter does not know.
    #[error("unknown operation: {kind}")]
    UnknownOperation {
        /// The `type` tag as received.
        kind: String,
        /// Position of the operation in the overlay.
        index: usize,
    },
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Errors raised while loading [`crate::FieldOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid field options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while decoding or encoding an [`crate::model::Overlay`].
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("malformed overlay: {0}")]
    Decode(serde_json::Error),
    #[error("overlay cannot be encoded: {0}")]
    Encode(serde_json::Error),
}

/// Errors raised while parsing a CSS color string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,
    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
    #[error("invalid color function `{0}`")]
    InvalidFunction(String),
    #[error("unknown color name `{0}`")]
    UnknownName(String),
}
