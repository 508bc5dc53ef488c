//! # scan-session-core
//!
//! Platform-agnostic barcode scan session core.
//!
//! Provides capability probing, permission negotiation, camera surface control
//! and the scan session state machine. Platform-specific strategies (modal
//! overlay, pass-through, web camera) implement the `ScanBackend` trait and
//! plug into the generic `ScanSession`.
//!
//! ## Architecture
//!
//! ```text
//! scan-session-core (this crate)
//! ├── traits/    ← ScanBackend, ScanDelegate
//! ├── models/    ← ScanPhase, BarcodeFormat, ScanConfiguration, PermissionStatus, errors
//! └── session/   ← CapabilityProbe, PermissionNegotiator, CameraSurfaceController, ScanSession
//! ```

pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::barcode::{BarcodeFormat, DecodedBarcode, ScanPayload};
pub use models::config::ScanConfiguration;
pub use models::error::{ConfigError, PlatformError, ScanErrorKind, ScanFailure, SessionError};
pub use models::permission::{PermissionDecision, PermissionStatus};
pub use models::state::{ScanPhase, SessionSnapshot};
pub use session::capability::{Capability, CapabilityProbe};
pub use session::permission::PermissionNegotiator;
pub use session::scan_session::ScanSession;
pub use session::surface::{CameraSurfaceController, SurfaceGuard};
pub use traits::scan_backend::{DecodeRequest, ScanBackend};
pub use traits::scan_delegate::ScanDelegate;
