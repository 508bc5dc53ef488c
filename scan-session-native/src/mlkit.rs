//! Modal overlay scanner backed by the ML Kit barcode scanning plugin.
//!
//! The plugin presents its own full-screen camera view for the duration of
//! `scan`, so activating the surface only arms the next `scan`; the modal is
//! dismissed on deactivation if it is still showing. A `decode` that arrives
//! after deactivation never opens the modal.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use scan_session_core::{
    DecodeRequest, DecodedBarcode, PermissionStatus, PlatformError, ScanBackend,
};
use serde::Deserialize;

use crate::deadline::with_timeout;
use crate::error::BridgeError;
use crate::formats::FormatScheme;

/// Answer of `requestPermissions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CameraPermissionState {
    pub camera: PermissionStatus,
}

/// One entry of the `barcodes` list returned by `scan`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlKitBarcode {
    pub raw_value: String,
    pub format: String,
}

/// Plugin boundary for the ML Kit scanner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MlKitBridge: Send + Sync {
    async fn is_supported(&self) -> Result<bool, BridgeError>;

    /// Android only. Other platforms report the module as available.
    async fn is_google_barcode_scanner_module_available(&self) -> Result<bool, BridgeError>;

    async fn install_google_barcode_scanner_module(&self) -> Result<(), BridgeError>;

    async fn request_permissions(&self) -> Result<CameraPermissionState, BridgeError>;

    /// Present the modal scanner and resolve once it closes.
    async fn scan(&self, formats: Vec<String>) -> Result<Vec<MlKitBarcode>, BridgeError>;

    /// Close the modal scanner if it is showing.
    fn dismiss(&self);
}

pub struct OverlayScanner<B: MlKitBridge> {
    bridge: B,
    armed: AtomicBool,
    modal_open: AtomicBool,
}

impl<B: MlKitBridge> OverlayScanner<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            armed: AtomicBool::new(false),
            modal_open: AtomicBool::new(false),
        }
    }

    fn dismiss_modal(&self) {
        if self.modal_open.swap(false, Ordering::SeqCst) {
            log::debug!("Dismissing overlay scanner");
            self.bridge.dismiss();
        }
    }
}

#[async_trait]
impl<B: MlKitBridge> ScanBackend for OverlayScanner<B> {
    async fn is_supported(&self) -> Result<bool, PlatformError> {
        Ok(self.bridge.is_supported().await?)
    }

    async fn install_module(&self) -> Result<(), PlatformError> {
        if self
            .bridge
            .is_google_barcode_scanner_module_available()
            .await?
        {
            return Ok(());
        }
        log::info!("Installing Google barcode scanner module");
        Ok(self.bridge.install_google_barcode_scanner_module().await?)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, PlatformError> {
        Ok(self.bridge.request_permissions().await?.camera)
    }

    fn activate_surface(&self) -> Result<(), PlatformError> {
        self.modal_open.store(true, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate_surface(&self) {
        self.armed.store(false, Ordering::SeqCst);
        self.dismiss_modal();
    }

    async fn decode(&self, request: &DecodeRequest) -> Result<Vec<DecodedBarcode>, PlatformError> {
        if !self.armed.swap(false, Ordering::SeqCst) {
            log::debug!("Overlay scanner not armed, skipping scan");
            return Err(PlatformError::Cancelled);
        }
        let formats = FormatScheme::Capacitor.identifiers(&request.formats);

        let scanned = with_timeout(request.timeout, async {
            self.bridge.scan(formats).await.map_err(PlatformError::from)
        })
        .await;

        match scanned {
            Ok(barcodes) => {
                self.modal_open.store(false, Ordering::SeqCst);
                Ok(barcodes
                    .into_iter()
                    .map(|barcode| {
                        let format = FormatScheme::Capacitor.parse(&barcode.format);
                        DecodedBarcode::new(barcode.raw_value, format)
                    })
                    .collect())
            }
            Err(e) => {
                // A timed-out modal is still on screen.
                self.dismiss_modal();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scan_session_core::BarcodeFormat;
    use std::time::Duration;

    fn barcode(raw_value: &str, format: &str) -> MlKitBarcode {
        MlKitBarcode {
            raw_value: raw_value.to_string(),
            format: format.to_string(),
        }
    }

    #[test]
    fn parses_plugin_payloads() {
        let permission: CameraPermissionState =
            serde_json::from_str(r#"{"camera":"limited"}"#).unwrap();
        assert_eq!(permission.camera, PermissionStatus::Limited);

        let barcode: MlKitBarcode =
            serde_json::from_str(r#"{"rawValue":"ABC123","format":"QR_CODE"}"#).unwrap();
        assert_eq!(barcode.raw_value, "ABC123");
    }

    #[tokio::test]
    async fn should_skip_install_when_module_present() {
        let mut bridge = MockMlKitBridge::new();
        bridge
            .expect_is_google_barcode_scanner_module_available()
            .times(1)
            .returning(|| Ok(true));
        bridge.expect_install_google_barcode_scanner_module().never();

        let scanner = OverlayScanner::new(bridge);
        assert!(scanner.install_module().await.is_ok());
    }

    #[tokio::test]
    async fn should_install_missing_module() {
        let mut bridge = MockMlKitBridge::new();
        bridge
            .expect_is_google_barcode_scanner_module_available()
            .returning(|| Ok(false));
        bridge
            .expect_install_google_barcode_scanner_module()
            .times(1)
            .returning(|| Ok(()));

        let scanner = OverlayScanner::new(bridge);
        assert!(scanner.install_module().await.is_ok());
    }

    #[tokio::test]
    async fn should_pass_permission_state_through() {
        let mut bridge = MockMlKitBridge::new();
        bridge.expect_request_permissions().returning(|| {
            Ok(CameraPermissionState {
                camera: PermissionStatus::PromptWithRationale,
            })
        });

        let scanner = OverlayScanner::new(bridge);
        assert_eq!(
            scanner.request_permission().await,
            Ok(PermissionStatus::PromptWithRationale)
        );
    }

    #[tokio::test]
    async fn should_request_capacitor_identifiers_and_map_results() {
        let mut bridge = MockMlKitBridge::new();
        bridge
            .expect_scan()
            .withf(|formats| formats == &vec!["EAN_13".to_string(), "QR_CODE".to_string()])
            .times(1)
            .returning(|_| Ok(vec![barcode("X", "MAXICODE"), barcode("ABC123", "QR_CODE")]));
        bridge.expect_dismiss().never();

        let scanner = OverlayScanner::new(bridge);
        scanner.activate_surface().unwrap();
        let request = DecodeRequest {
            formats: vec![BarcodeFormat::Ean13, BarcodeFormat::QrCode],
            timeout: None,
        };
        let decoded = scanner.decode(&request).await.unwrap();

        assert_eq!(
            decoded,
            vec![
                DecodedBarcode::new("X", None),
                DecodedBarcode::new("ABC123", Some(BarcodeFormat::QrCode)),
            ]
        );
        // Modal closed on its own; nothing to dismiss.
        scanner.deactivate_surface();
    }

    #[tokio::test]
    async fn should_map_plugin_cancel_to_cancelled() {
        let mut bridge = MockMlKitBridge::new();
        bridge
            .expect_scan()
            .returning(|_| Err(BridgeError::rejected("canceled", "scan canceled")));
        bridge.expect_dismiss().times(1).return_const(());

        let scanner = OverlayScanner::new(bridge);
        scanner.activate_surface().unwrap();
        let request = DecodeRequest {
            formats: vec![BarcodeFormat::QrCode],
            timeout: None,
        };
        assert_eq!(scanner.decode(&request).await, Err(PlatformError::Cancelled));
    }

    #[tokio::test]
    async fn should_not_open_modal_after_deactivation() {
        let mut bridge = MockMlKitBridge::new();
        bridge.expect_scan().never();
        bridge.expect_dismiss().return_const(());

        let scanner = OverlayScanner::new(bridge);
        scanner.activate_surface().unwrap();
        scanner.deactivate_surface();

        let request = DecodeRequest {
            formats: vec![BarcodeFormat::QrCode],
            timeout: None,
        };
        assert_eq!(scanner.decode(&request).await, Err(PlatformError::Cancelled));
        assert!(!scanner.modal_open.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn should_scan_once_per_activation() {
        let mut bridge = MockMlKitBridge::new();
        bridge.expect_scan().times(1).returning(|_| Ok(Vec::new()));

        let scanner = OverlayScanner::new(bridge);
        scanner.activate_surface().unwrap();
        let request = DecodeRequest {
            formats: vec![BarcodeFormat::QrCode],
            timeout: None,
        };
        assert_eq!(scanner.decode(&request).await, Ok(Vec::new()));
        assert_eq!(scanner.decode(&request).await, Err(PlatformError::Cancelled));
    }

    /// Bridge whose modal never resolves on its own.
    struct StuckModal {
        dismissed: AtomicBool,
    }

    #[async_trait]
    impl MlKitBridge for StuckModal {
        async fn is_supported(&self) -> Result<bool, BridgeError> {
            Ok(true)
        }

        async fn is_google_barcode_scanner_module_available(&self) -> Result<bool, BridgeError> {
            Ok(true)
        }

        async fn install_google_barcode_scanner_module(&self) -> Result<(), BridgeError> {
            Ok(())
        }

        async fn request_permissions(&self) -> Result<CameraPermissionState, BridgeError> {
            Ok(CameraPermissionState {
                camera: PermissionStatus::Granted,
            })
        }

        async fn scan(&self, _formats: Vec<String>) -> Result<Vec<MlKitBarcode>, BridgeError> {
            std::future::pending().await
        }

        fn dismiss(&self) {
            self.dismissed.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_dismiss_modal_when_decode_times_out() {
        let scanner = OverlayScanner::new(StuckModal {
            dismissed: AtomicBool::new(false),
        });
        scanner.activate_surface().unwrap();
        let request = DecodeRequest {
            formats: vec![BarcodeFormat::QrCode],
            timeout: Some(Duration::from_secs(10)),
        };

        assert_eq!(scanner.decode(&request).await, Err(PlatformError::Timeout));
        assert!(scanner.bridge.dismissed.load(Ordering::SeqCst));
    }
}
