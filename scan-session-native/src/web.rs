//! Browser camera scanner: media devices for the preview, `BarcodeDetector`
//! for decoding.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use scan_session_core::{
    BarcodeFormat, DecodeRequest, DecodedBarcode, PermissionStatus, PlatformError, ScanBackend,
};
use serde::Deserialize;

use crate::deadline::with_timeout;
use crate::error::BridgeError;
use crate::formats::FormatScheme;

/// One result of `BarcodeDetector.detect`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedBarcode {
    pub raw_value: String,
    pub format: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebCameraBridge: Send + Sync {
    /// `navigator.mediaDevices` is present (secure context).
    fn has_media_devices(&self) -> bool;

    /// `BarcodeDetector.getSupportedFormats()`. Fails when the detector API
    /// is missing.
    async fn detector_formats(&self) -> Result<Vec<String>, BridgeError>;

    /// State of the `camera` permission, prompting if needed.
    async fn camera_permission(&self) -> Result<PermissionStatus, BridgeError>;

    fn attach_preview(&self) -> Result<(), BridgeError>;

    fn detach_preview(&self);

    /// Detect barcodes in the live preview until something is found.
    async fn detect(&self, formats: Vec<String>) -> Result<Vec<DetectedBarcode>, BridgeError>;
}

pub struct WebCameraScanner<B: WebCameraBridge> {
    bridge: B,
    detector_formats: Mutex<Option<Vec<BarcodeFormat>>>,
    armed: AtomicBool,
}

impl<B: WebCameraBridge> WebCameraScanner<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            detector_formats: Mutex::new(None),
            armed: AtomicBool::new(false),
        }
    }

    async fn known_formats(&self) -> Result<Vec<BarcodeFormat>, PlatformError> {
        let cached = self.detector_formats.lock().clone();
        if let Some(formats) = cached {
            return Ok(formats);
        }
        let formats: Vec<BarcodeFormat> = self
            .bridge
            .detector_formats()
            .await?
            .iter()
            .filter_map(|identifier| FormatScheme::WebDetector.parse(identifier))
            .collect();
        *self.detector_formats.lock() = Some(formats.clone());
        Ok(formats)
    }
}

#[async_trait]
impl<B: WebCameraBridge> ScanBackend for WebCameraScanner<B> {
    async fn is_supported(&self) -> Result<bool, PlatformError> {
        if !self.bridge.has_media_devices() {
            log::debug!("No media devices exposed; web camera scanning unavailable");
            return Ok(false);
        }
        Ok(!self.known_formats().await?.is_empty())
    }

    async fn install_module(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn request_permission(&self) -> Result<PermissionStatus, PlatformError> {
        Ok(self.bridge.camera_permission().await?)
    }

    fn activate_surface(&self) -> Result<(), PlatformError> {
        self.bridge.attach_preview()?;
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate_surface(&self) {
        self.armed.store(false, Ordering::SeqCst);
        self.bridge.detach_preview();
    }

    async fn decode(&self, request: &DecodeRequest) -> Result<Vec<DecodedBarcode>, PlatformError> {
        if !self.armed.swap(false, Ordering::SeqCst) {
            log::debug!("Web camera scanner not armed, skipping detection");
            return Err(PlatformError::Cancelled);
        }
        let known = self.known_formats().await?;
        let usable: Vec<BarcodeFormat> = request
            .formats
            .iter()
            .copied()
            .filter(|format| known.contains(format))
            .collect();
        if usable.is_empty() {
            return Err(PlatformError::Unavailable(format!(
                "barcode detector supports none of {:?}",
                request.formats
            )));
        }

        let identifiers = FormatScheme::WebDetector.identifiers(&usable);
        let detected = with_timeout(request.timeout, async {
            self.bridge
                .detect(identifiers)
                .await
                .map_err(PlatformError::from)
        })
        .await?;

        Ok(detected
            .into_iter()
            .map(|barcode| {
                let format = FormatScheme::WebDetector.parse(&barcode.format);
                DecodedBarcode::new(barcode.raw_value, format)
            })
            .collect())
    }
}
