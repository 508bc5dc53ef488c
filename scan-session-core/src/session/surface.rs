use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::models::error::PlatformError;
use crate::traits::scan_backend::ScanBackend;

/// Owns the activation state of the camera surface.
///
/// At most one activation is live at a time. Every successful activation is
/// paired with exactly one backend deactivation; extra deactivations are
/// no-ops.
pub struct CameraSurfaceController {
    pub(super) session_id: Uuid,
    backend: Arc<dyn ScanBackend>,
    active: AtomicBool,
}

impl CameraSurfaceController {
    pub fn new(backend: Arc<dyn ScanBackend>, session_id: Uuid) -> Self {
        Self {
            session_id,
            backend,
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Engage the camera surface and return a guard that releases it on drop.
    ///
    /// If the backend fails to activate, it is still told to deactivate once
    /// so any half-applied visual change is rolled back.
    pub fn activate(self: &Arc<Self>) -> Result<SurfaceGuard, PlatformError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PlatformError::Busy);
        }

        match self.backend.activate_surface() {
            Ok(()) => {
                log::debug!("[scan {}] camera surface activated", self.session_id);
                Ok(SurfaceGuard {
                    controller: Arc::clone(self),
                })
            }
            Err(e) => {
                log::warn!(
                    "[scan {}] camera surface activation failed: {}",
                    self.session_id,
                    e
                );
                self.backend.deactivate_surface();
                self.active.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Restore the pre-activation visual state. Returns `false` when the
    /// surface was not active.
    pub fn deactivate(&self) -> bool {
        if !self.active.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.backend.deactivate_surface();
        log::debug!("[scan {}] camera surface deactivated", self.session_id);
        true
    }
}

/// Scoped activation of the camera surface. Dropping it deactivates.
#[must_use = "dropping the guard deactivates the camera surface"]
pub struct SurfaceGuard {
    controller: Arc<CameraSurfaceController>,
}

impl SurfaceGuard {
    /// Deactivate now instead of at end of scope.
    pub fn release(self) {}
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        self.controller.deactivate();
    }
}
