use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::traits::scan_backend::ScanBackend;

/// Outcome of a capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Supported,
    Unsupported,
}

impl Capability {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported)
    }
}

/// Determines once per session whether scanning is usable on this device.
///
/// The first answer is cached for the lifetime of the probe. Platform errors
/// count as `Unsupported`.
pub struct CapabilityProbe {
    pub(super) session_id: Uuid,
    backend: Arc<dyn ScanBackend>,
    cached: Mutex<Option<Capability>>,
}

impl CapabilityProbe {
    pub fn new(backend: Arc<dyn ScanBackend>, session_id: Uuid) -> Self {
        Self {
            session_id,
            backend,
            cached: Mutex::new(None),
        }
    }

    /// The memoized answer, if the probe has run.
    pub fn cached(&self) -> Option<Capability> {
        *self.cached.lock()
    }

    /// Probe the backend, or return the cached answer.
    ///
    /// On the first `Supported` answer the platform module install is started
    /// in the background when `install_module` is set.
    pub async fn probe(&self, install_module: bool) -> Capability {
        if let Some(capability) = self.cached() {
            return capability;
        }

        let capability = match self.backend.is_supported().await {
            Ok(true) => Capability::Supported,
            Ok(false) => Capability::Unsupported,
            Err(e) => {
                log::warn!(
                    "[scan {}] capability probe failed, treating as unsupported: {}",
                    self.session_id,
                    e
                );
                Capability::Unsupported
            }
        };
        *self.cached.lock() = Some(capability);

        if capability.is_supported() && install_module {
            self.spawn_module_install();
        }

        capability
    }

    fn spawn_module_install(&self) {
        let backend = Arc::clone(&self.backend);
        let id = self.session_id;
        let install = async move {
            match backend.install_module().await {
                Ok(()) => log::debug!("[scan {}] scanner module install finished", id),
                // Install may still complete later on the platform side.
                Err(e) => log::warn!("[scan {}] scanner module install failed: {}", id, e),
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(install);
            }
            Err(_) => log::warn!(
                "[scan {}] no async runtime available, skipping scanner module install",
                self.session_id
            ),
        }
    }
}
