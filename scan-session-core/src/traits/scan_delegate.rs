use crate::models::barcode::ScanPayload;
use crate::models::error::ScanFailure;
use crate::models::state::ScanPhase;

/// Event delegate for scan session notifications.
///
/// Methods are called from whichever task drives the session, never while the
/// session lock is held. Implementations should marshal to the UI thread if
/// needed.
pub trait ScanDelegate: Send + Sync {
    /// Called after every phase transition.
    fn on_phase_changed(&self, phase: ScanPhase);

    /// Called exactly once per successful scan.
    fn on_result(&self, payload: &ScanPayload);

    /// Called when a scan attempt fails.
    fn on_error(&self, failure: &ScanFailure);

    /// Called once, when the session is closed. Nothing fires after it.
    fn on_closed(&self);
}
