use std::time::Duration;

use async_trait::async_trait;

use crate::models::barcode::{BarcodeFormat, DecodedBarcode};
use crate::models::config::ScanConfiguration;
use crate::models::error::PlatformError;
use crate::models::permission::PermissionStatus;

/// Parameters handed to [`ScanBackend::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRequest {
    /// Requested symbologies, in stable order.
    pub formats: Vec<BarcodeFormat>,
    /// Passed through untouched; enforcing it is up to the backend.
    pub timeout: Option<Duration>,
}

impl From<&ScanConfiguration> for DecodeRequest {
    fn from(config: &ScanConfiguration) -> Self {
        Self {
            formats: config.formats.iter().copied().collect(),
            timeout: config.timeout,
        }
    }
}

/// Interface for platform-specific scanning strategies.
///
/// Implemented by:
/// - `OverlayScanner` (modal native view that owns its camera surface)
/// - `PassThroughScanner` (host page made transparent over the OS camera layer)
/// - `WebCameraScanner` (browser media devices + barcode detector)
///
/// Surface methods are synchronous so the session can release the surface
/// from `Drop` on any exit path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// Whether scanning hardware/software is usable on this device.
    async fn is_supported(&self) -> Result<bool, PlatformError>;

    /// Install the platform scanner module if it is missing. Idempotent.
    async fn install_module(&self) -> Result<(), PlatformError>;

    /// Ask for camera access, in the platform's own vocabulary.
    async fn request_permission(&self) -> Result<PermissionStatus, PlatformError>;

    /// Make the camera feed visible.
    fn activate_surface(&self) -> Result<(), PlatformError>;

    /// Restore the pre-activation visual state.
    fn deactivate_surface(&self);

    /// Run one decode. Candidates are returned in native order; an empty list
    /// means the user dismissed the scanner without a result. A decode that
    /// finds the surface already deactivated fails with
    /// `PlatformError::Cancelled` without starting the native scanner.
    async fn decode(&self, request: &DecodeRequest) -> Result<Vec<DecodedBarcode>, PlatformError>;
}
