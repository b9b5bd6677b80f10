//! Error types for the strata core.

use thiserror::Error;

/// Errors produced by layer, canvas and scene operations.
///
/// Numerical degeneracy (singular matrices, near-zero weights) is never an
/// error: layers degrade gracefully instead.
#[derive(Debug, Error)]
pub enum LayerError {
    /// Width or height was zero (or overflowed) when creating a surface or canvas.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A requested parameter name is not part of the layer's vocabulary.
    #[error("unknown parameter: {0}")]
    UnknownParam(String),

    /// A parameter existed but the supplied value had the wrong type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A parameter had the right type but a value the layer does not accept.
    #[error("invalid value for parameter '{name}': {reason}")]
    InvalidParamValue { name: String, reason: String },

    /// No layer kind is registered under this name.
    #[error("unknown layer kind: {0}")]
    UnknownLayerKind(String),

    /// No layer with this name exists in the canvas.
    #[error("layer not found: {0}")]
    LayerNotFound(String),

    /// A layer with this name already exists in the canvas.
    #[error("duplicate layer name: {0}")]
    DuplicateLayerName(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A gradient could not be constructed from the given stops.
    #[error("invalid gradient: {0}")]
    InvalidGradient(String),

    /// A scene description was malformed.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    /// A progress callback asked the render pass to stop.
    #[error("render cancelled")]
    Cancelled,

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(String),
}
