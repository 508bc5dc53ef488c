//! Pass-through scanner backed by the community barcode scanner plugin.
//!
//! The native camera preview renders *behind* the web view. Activation makes
//! the web view background transparent and tags the document body so host
//! CSS can hide the rest of the page; deactivation undoes both and stops the
//! native preview. A `decode` that arrives after deactivation never starts
//! the preview.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use scan_session_core::{
    BarcodeFormat, DecodeRequest, DecodedBarcode, PermissionStatus, PlatformError, ScanBackend,
};
use serde::Deserialize;

use crate::deadline::with_timeout;
use crate::error::BridgeError;
use crate::formats::FormatScheme;

/// Class added to the document body while the camera shows through.
pub const SCANNER_ACTIVE_CLASS: &str = "scanner-active";

/// Answer of `checkPermission`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermissionCheck {
    pub granted: bool,
    pub denied: bool,
    pub never_asked: bool,
}

/// Answer of `startScan`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PassThroughScanResult {
    pub has_content: bool,
    pub content: Option<String>,
    pub format: Option<String>,
}

/// Plugin boundary for the community scanner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PassThroughBridge: Send + Sync {
    /// Whether the plugin is registered in this host.
    fn is_available(&self) -> bool;

    /// `force` prompts the user when permission was never asked.
    async fn check_permission(&self, force: bool) -> Result<PermissionCheck, BridgeError>;

    fn hide_background(&self) -> Result<(), BridgeError>;

    fn show_background(&self);

    /// Resolves with the first barcode seen, or without content once
    /// `stop_scan` is called.
    async fn start_scan(&self, target_formats: Vec<String>) -> Result<PassThroughScanResult, BridgeError>;

    fn stop_scan(&self);
}

/// The host document whose body is tagged while scanning.
#[cfg_attr(test, mockall::automock)]
pub trait HostDocument: Send + Sync {
    fn add_body_class(&self, class: &str) -> Result<(), BridgeError>;

    fn remove_body_class(&self, class: &str);
}

pub struct PassThroughScanner<B: PassThroughBridge, D: HostDocument> {
    bridge: B,
    document: D,
    background_hidden: AtomicBool,
    armed: AtomicBool,
}

impl<B: PassThroughBridge, D: HostDocument> PassThroughScanner<B, D> {
    pub fn new(bridge: B, document: D) -> Self {
        Self {
            bridge,
            document,
            background_hidden: AtomicBool::new(false),
            armed: AtomicBool::new(false),
        }
    }

    /// The plugin often omits the format. With a single requested format
    /// that one is implied; otherwise the candidate stays unrecognized.
    fn resolve_format(reported: Option<&str>, requested: &[BarcodeFormat]) -> Option<BarcodeFormat> {
        match reported {
            Some(identifier) => FormatScheme::Capacitor.parse(identifier),
            None => match requested {
                [only] => Some(*only),
                _ => None,
            },
        }
    }
}

#[async_trait]
impl<B: PassThroughBridge, D: HostDocument> ScanBackend for PassThroughScanner<B, D> {
    async fn is_supported(&self) -> Result<bool, PlatformError> {
        Ok(self.bridge.is_available())
    }

    async fn install_module(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn request_permission(&self) -> Result<PermissionStatus, PlatformError> {
        let check = self.bridge.check_permission(true).await?;
        log::debug!("Pass-through permission check: {:?}", check);
        Ok(PermissionStatus::from(check.granted))
    }

    fn activate_surface(&self) -> Result<(), PlatformError> {
        self.background_hidden.store(true, Ordering::SeqCst);
        self.bridge.hide_background()?;
        self.document.add_body_class(SCANNER_ACTIVE_CLASS)?;
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate_surface(&self) {
        self.armed.store(false, Ordering::SeqCst);
        self.bridge.stop_scan();
        if self.background_hidden.swap(false, Ordering::SeqCst) {
            self.bridge.show_background();
        }
        self.document.remove_body_class(SCANNER_ACTIVE_CLASS);
    }

    async fn decode(&self, request: &DecodeRequest) -> Result<Vec<DecodedBarcode>, PlatformError> {
        if !self.armed.swap(false, Ordering::SeqCst) {
            log::debug!("Pass-through scanner not armed, skipping scan");
            return Err(PlatformError::Cancelled);
        }
        let targets = FormatScheme::Capacitor.identifiers(&request.formats);
        let scanned = with_timeout(request.timeout, async {
            self.bridge
                .start_scan(targets)
                .await
                .map_err(PlatformError::from)
        })
        .await;

        let result = match scanned {
            Ok(result) => result,
            Err(e) => {
                // Leave no native preview running behind the page.
                self.bridge.stop_scan();
                return Err(e);
            }
        };

        match result.content {
            Some(content) if result.has_content => {
                let format = Self::resolve_format(result.format.as_deref(), &request.formats);
                Ok(vec![DecodedBarcode::new(content, format)])
            }
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    fn qr_request() -> DecodeRequest {
        DecodeRequest {
            formats: vec![BarcodeFormat::QrCode],
            timeout: None,
        }
    }

    /// Scanner whose surface has been activated.
    fn armed_scanner(
        mut bridge: MockPassThroughBridge,
    ) -> PassThroughScanner<MockPassThroughBridge, MockHostDocument> {
        let mut document = MockHostDocument::new();
        bridge.expect_hide_background().returning(|| Ok(()));
        document.expect_add_body_class().returning(|_| Ok(()));
        let scanner = PassThroughScanner::new(bridge, document);
        scanner.activate_surface().unwrap();
        scanner
    }

    #[test]
    fn parses_plugin_payloads() {
        let result: PassThroughScanResult =
            serde_json::from_str(r#"{"hasContent":true,"content":"ABC123"}"#).unwrap();
        assert!(result.has_content);
        assert_eq!(result.content.as_deref(), Some("ABC123"));
        assert_eq!(result.format, None);

        let check: PermissionCheck =
            serde_json::from_str(r#"{"granted":false,"neverAsked":true}"#).unwrap();
        assert!(!check.granted);
        assert!(check.never_asked);
    }

    #[tokio::test]
    async fn should_force_permission_prompt_and_map_boolean() {
        let mut bridge = MockPassThroughBridge::new();
        bridge
            .expect_check_permission()
            .withf(|force| *force)
            .times(1)
            .returning(|_| {
                Ok(PermissionCheck {
                    granted: true,
                    ..Default::default()
                })
            });

        let scanner = PassThroughScanner::new(bridge, MockHostDocument::new());
        assert_eq!(scanner.request_permission().await, Ok(PermissionStatus::Granted));
    }

    #[test]
    fn activation_hides_background_then_tags_body() {
        let mut seq = Sequence::new();
        let mut bridge = MockPassThroughBridge::new();
        let mut document = MockHostDocument::new();
        bridge
            .expect_hide_background()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        document
            .expect_add_body_class()
            .withf(|class| class == SCANNER_ACTIVE_CLASS)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let scanner = PassThroughScanner::new(bridge, document);
        assert!(scanner.activate_surface().is_ok());
    }

    #[test]
    fn deactivation_restores_page() {
        let mut bridge = MockPassThroughBridge::new();
        let mut document = MockHostDocument::new();
        bridge.expect_hide_background().returning(|| Ok(()));
        document.expect_add_body_class().returning(|_| Ok(()));
        bridge.expect_stop_scan().times(1).return_const(());
        bridge.expect_show_background().times(1).return_const(());
        document
            .expect_remove_body_class()
            .withf(|class| class == SCANNER_ACTIVE_CLASS)
            .times(1)
            .return_const(());

        let scanner = PassThroughScanner::new(bridge, document);
        scanner.activate_surface().unwrap();
        scanner.deactivate_surface();
    }

    #[test]
    fn failed_body_tagging_still_rolls_back_background() {
        let mut bridge = MockPassThroughBridge::new();
        let mut document = MockHostDocument::new();
        bridge.expect_hide_background().returning(|| Ok(()));
        document
            .expect_add_body_class()
            .returning(|_| Err(BridgeError::Document("no body".into())));
        bridge.expect_stop_scan().return_const(());
        bridge.expect_show_background().times(1).return_const(());
        document.expect_remove_body_class().return_const(());

        let scanner = PassThroughScanner::new(bridge, document);
        assert_eq!(
            scanner.activate_surface(),
            Err(PlatformError::Native("no body".into()))
        );
        // The session always follows a failed activation with a deactivation.
        scanner.deactivate_surface();
    }

    #[tokio::test]
    async fn should_imply_single_requested_format() {
        let mut bridge = MockPassThroughBridge::new();
        bridge
            .expect_start_scan()
            .withf(|targets| targets == &vec!["QR_CODE".to_string()])
            .returning(|_| {
                Ok(PassThroughScanResult {
                    has_content: true,
                    content: Some("ABC123".into()),
                    format: None,
                })
            });

        let scanner = armed_scanner(bridge);
        let decoded = scanner.decode(&qr_request()).await.unwrap();
        assert_eq!(
            decoded,
            vec![DecodedBarcode::new("ABC123", Some(BarcodeFormat::QrCode))]
        );
    }

    #[tokio::test]
    async fn should_leave_format_unknown_when_ambiguous() {
        let mut bridge = MockPassThroughBridge::new();
        bridge.expect_start_scan().returning(|_| {
            Ok(PassThroughScanResult {
                has_content: true,
                content: Some("4006381333931".into()),
                format: None,
            })
        });

        let scanner = armed_scanner(bridge);
        let request = DecodeRequest {
            formats: vec![BarcodeFormat::Ean13, BarcodeFormat::QrCode],
            timeout: None,
        };
        let decoded = scanner.decode(&request).await.unwrap();
        assert_eq!(decoded, vec![DecodedBarcode::new("4006381333931", None)]);
    }

    #[tokio::test]
    async fn should_return_nothing_when_stopped_without_content() {
        let mut bridge = MockPassThroughBridge::new();
        bridge
            .expect_start_scan()
            .returning(|_| Ok(PassThroughScanResult::default()));

        let scanner = armed_scanner(bridge);
        assert_eq!(scanner.decode(&qr_request()).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn should_stop_preview_when_scan_fails() {
        let mut bridge = MockPassThroughBridge::new();
        bridge
            .expect_start_scan()
            .returning(|_| Err(BridgeError::rejected("ERROR", "camera unavailable")));
        bridge.expect_stop_scan().times(1).return_const(());

        let scanner = armed_scanner(bridge);
        assert_eq!(
            scanner.decode(&qr_request()).await,
            Err(PlatformError::Native("camera unavailable".into()))
        );
    }

    #[tokio::test]
    async fn should_not_start_preview_after_deactivation() {
        let mut bridge = MockPassThroughBridge::new();
        bridge.expect_start_scan().never();
        bridge.expect_stop_scan().times(1).return_const(());
        bridge.expect_show_background().times(1).return_const(());

        let mut scanner = armed_scanner(bridge);
        scanner.document.expect_remove_body_class().return_const(());
        scanner.deactivate_surface();

        assert_eq!(
            scanner.decode(&qr_request()).await,
            Err(PlatformError::Cancelled)
        );
    }
}
