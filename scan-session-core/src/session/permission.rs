use std::sync::Arc;

use uuid::Uuid;

use crate::models::permission::PermissionDecision;
use crate::traits::scan_backend::ScanBackend;

/// Requests camera access and reduces the platform answer to granted/denied.
///
/// Never cached: a grant can be revoked between attempts.
pub struct PermissionNegotiator {
    pub(super) session_id: Uuid,
    backend: Arc<dyn ScanBackend>,
}

impl PermissionNegotiator {
    pub fn new(backend: Arc<dyn ScanBackend>, session_id: Uuid) -> Self {
        Self {
            session_id,
            backend,
        }
    }

    pub async fn request_permission(&self) -> PermissionDecision {
        match self.backend.request_permission().await {
            Ok(status) => {
                let decision = PermissionDecision::from(status);
                log::debug!(
                    "[scan {}] camera permission {:?} -> {:?}",
                    self.session_id,
                    status,
                    decision
                );
                decision
            }
            Err(e) => {
                log::warn!(
                    "[scan {}] permission request failed, treating as denied: {}",
                    self.session_id,
                    e
                );
                PermissionDecision::Denied
            }
        }
    }
}
