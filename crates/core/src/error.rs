/// Result alias that carries the custom [`WaveLineError`] type.
pub type Result<T> = std::result::Result<T, WaveLineError>;

/// Common error type for the core crate.
///
/// Nothing in here escapes a render tick: the loop logs and swallows every
/// failure. These variants surface from configuration loading, color parsing
/// and frame export.
#[derive(Debug, thiserror::Error)]
pub enum WaveLineError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration documents that fail to parse.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A configuration value outside of its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Color strings that are not `#RRGGBB` or `#AARRGGBB`.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    /// The drawing surface was torn down while a frame was requested.
    #[error("render surface is no longer available")]
    SurfaceLost,
    /// Encoding a published frame failed.
    #[error("png encoding failed: {0}")]
    Png(String),
}

impl WaveLineError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for WaveLineError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for WaveLineError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
