//! Error types for `KhAsset`

use thiserror::Error;

/// The error type for `KhAsset` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Model Encoding Errors ====================
    /// Input mesh data is structurally unusable (empty chunk, dangling index, ...).
    #[error("malformed input: {message}")]
    MalformedInput {
        /// Description of what is malformed.
        message: String,
    },

    /// A count does not fit the fixed-width field the container stores it in.
    #[error("{what} count {count} exceeds the format limit of {max}")]
    CapacityExceeded {
        /// Which count overflowed (e.g. "chunk vertex").
        what: &'static str,
        /// The offending count.
        count: usize,
        /// The largest representable count.
        max: usize,
    },

    // ==================== Animation Errors ====================
    /// Frame range is inverted, or a query/keyframe value is not finite.
    #[error("invalid range: {message}")]
    InvalidRange {
        /// Description of the invalid value.
        message: String,
    },

    // ==================== glTF Import Errors ====================
    /// Failed to load or parse a glTF file.
    #[error("failed to load glTF: {message}")]
    GltfLoadFailed {
        /// The error message from the glTF parser.
        message: String,
    },

    // ==================== Texture Errors ====================
    /// The source image uses a pixel layout the TIM2 encoder cannot consume.
    #[error("unsupported image format: {format}")]
    UnsupportedImageFormat {
        /// The format description.
        format: String,
    },

    /// Failed to read or encode a texture.
    #[error("failed to encode texture '{name}': {message}")]
    TextureEncodeFailed {
        /// The texture name.
        name: String,
        /// The error message.
        message: String,
    },

    // ==================== Parsing Errors ====================
    /// Encoder configuration could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedInput {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_range(message: impl Into<String>) -> Self {
        Error::InvalidRange {
            message: message.into(),
        }
    }
}

// Add conversion from walkdir::Error
impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `KhAsset` operations.
pub type Result<T> = std::result::Result<T, Error>;
