use serde::{Deserialize, Serialize};

use super::barcode::ScanPayload;
use super::error::ScanFailure;

/// Scan session phases.
///
/// State transitions:
/// ```text
/// idle → probing_capability → requesting_permission → scanning → succeeded
///              ↓                        ↓                 ↓ ↘
///            failed ←──────────────── failed ←────────── failed   idle (empty/cancelled)
///
/// succeeded/failed --reset--> idle
/// any --close--> closed (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Idle,
    ProbingCapability,
    RequestingPermission,
    Scanning,
    Succeeded,
    Failed,
    Closed,
}

impl ScanPhase {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// A `start_scan` call is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::ProbingCapability | Self::RequestingPermission | Self::Scanning
        )
    }

    /// Phases that hold either a result or an error.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScanPhase::Idle => "idle",
            ScanPhase::ProbingCapability => "probing_capability",
            ScanPhase::RequestingPermission => "requesting_permission",
            ScanPhase::Scanning => "scanning",
            ScanPhase::Succeeded => "succeeded",
            ScanPhase::Failed => "failed",
            ScanPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of a session, read under a single lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: ScanPhase,
    /// `None` until the capability probe has run.
    pub supported: Option<bool>,
    /// `None` until permission has been requested; refreshed on every attempt.
    pub permission_granted: Option<bool>,
    pub last_result: Option<ScanPayload>,
    pub last_error: Option<ScanFailure>,
    pub surface_active: bool,
}
