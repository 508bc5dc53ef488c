use scan_session_core::PlatformError;
use thiserror::Error;

/// Errors raised by a native plugin bridge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The plugin is not registered in this host.
    #[error("plugin not available: {0}")]
    PluginMissing(String),

    #[error("cancelled")]
    Cancelled,

    /// The plugin call was rejected with an error code.
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    #[error("document error: {0}")]
    Document(String),
}

impl BridgeError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<BridgeError> for PlatformError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::PluginMissing(name) => PlatformError::Unavailable(name),
            BridgeError::Cancelled => PlatformError::Cancelled,
            // Plugins report a user dismissal as a rejected call.
            BridgeError::Rejected { ref code, .. }
                if code.eq_ignore_ascii_case("canceled") || code.eq_ignore_ascii_case("cancelled") =>
            {
                PlatformError::Cancelled
            }
            BridgeError::Rejected { message, .. } => PlatformError::Native(message),
            BridgeError::Document(message) => PlatformError::Native(message),
        }
    }
}
