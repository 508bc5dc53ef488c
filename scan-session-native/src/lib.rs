//! # scan-session-native
//!
//! Native scanner strategies for scan-session-kit.
//!
//! Provides:
//! - `OverlayScanner`: ML Kit modal scanner that owns its own camera view
//! - `PassThroughScanner`: community plugin; camera renders behind a transparent web view
//! - `WebCameraScanner`: browser media devices + `BarcodeDetector`
//! - `select_strategy`: pick a strategy for a `DeploymentTarget`
//!
//! Each strategy talks to the host through a small bridge trait
//! (`MlKitBridge`, `PassThroughBridge` + `HostDocument`, `WebCameraBridge`)
//! and implements `scan_session_core::ScanBackend`.
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use scan_session_core::ScanSession;
//! use scan_session_native::OverlayScanner;
//!
//! let backend = Arc::new(OverlayScanner::new(capacitor_mlkit_bridge));
//! let session = ScanSession::new(backend);
//! let phase = session.start_scan(None).await?;
//! ```

mod deadline;
pub mod error;
pub mod formats;
pub mod mlkit;
pub mod passthrough;
pub mod strategy;
pub mod web;

pub use error::BridgeError;
pub use formats::FormatScheme;
pub use mlkit::{CameraPermissionState, MlKitBarcode, MlKitBridge, OverlayScanner};
pub use passthrough::{
    HostDocument, PassThroughBridge, PassThroughScanResult, PassThroughScanner, PermissionCheck,
    SCANNER_ACTIVE_CLASS,
};
pub use strategy::{select_strategy, DeploymentTarget, ScannerStrategy, StrategyError};
pub use web::{DetectedBarcode, WebCameraBridge, WebCameraScanner};
