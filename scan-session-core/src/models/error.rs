use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::ScanPhase;

/// Errors reported by a platform backend.
///
/// These never reach the host directly: each session stage maps them onto a
/// [`ScanFailure`] (or, for probe and permission, onto a fail-closed answer).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("scanner unavailable: {0}")]
    Unavailable(String),

    /// The user or the platform dismissed the scanner without a result.
    #[error("scan cancelled")]
    Cancelled,

    #[error("camera busy")]
    Busy,

    #[error("timeout")]
    Timeout,

    #[error("{0}")]
    Native(String),
}

/// Error categories surfaced to the host through `ScanDelegate::on_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanErrorKind {
    /// Device lacks scanning capability. Terminal for the session.
    Unsupported,
    PermissionDenied,
    ActivationFailed,
    ScanError,
}

impl ScanErrorKind {
    /// Whether the host should offer a retry affordance.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

impl std::fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanErrorKind::Unsupported => write!(f, "unsupported"),
            ScanErrorKind::PermissionDenied => write!(f, "permission_denied"),
            ScanErrorKind::ActivationFailed => write!(f, "activation_failed"),
            ScanErrorKind::ScanError => write!(f, "scan_error"),
        }
    }
}

/// Error descriptor stored on the session and passed to the host.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ScanFailure {
    pub kind: ScanErrorKind,
    pub message: String,
}

impl ScanFailure {
    pub fn new(kind: ScanErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported() -> Self {
        Self::new(
            ScanErrorKind::Unsupported,
            "Barcode scanning is not supported on this device",
        )
    }

    pub fn permission_denied() -> Self {
        Self::new(
            ScanErrorKind::PermissionDenied,
            "Camera permission is required to scan QR codes",
        )
    }

    pub fn activation_failed(cause: &PlatformError) -> Self {
        Self::new(
            ScanErrorKind::ActivationFailed,
            format!("Camera could not be activated: {}", cause),
        )
    }

    pub fn scan_error(cause: &PlatformError) -> Self {
        Self::new(ScanErrorKind::ScanError, format!("Scan failed: {}", cause))
    }
}

/// Misuse of the session API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {operation} from {phase} phase")]
    InvalidTransition {
        operation: &'static str,
        phase: ScanPhase,
    },

    #[error("session closed")]
    Closed,

    #[error(transparent)]
    InvalidConfiguration(#[from] ConfigError),
}

/// Invalid scan configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one barcode format must be selected")]
    NoFormats,

    #[error("decode timeout must be greater than zero")]
    ZeroTimeout,

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}
