/// Result alias that carries the custom [`DaycycleError`] type.
pub type Result<T> = std::result::Result<T, DaycycleError>;

/// Common error type for the core crate.
///
/// Transport, codec and brightness operations are total and never produce an
/// error. Only the edges of the system (configuration files, the CLI) do.
#[derive(Debug, thiserror::Error)]
pub enum DaycycleError {
    /// Free-form message surfaced by the application layer.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A configuration or scene document could not be (de)serialized.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// A configuration value parsed but is outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DaycycleError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn invalid_config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<&str> for DaycycleError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for DaycycleError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
