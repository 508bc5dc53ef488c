use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};
use uuid::Uuid;

use crate::models::barcode::{DecodedBarcode, ScanPayload};
use crate::models::config::ScanConfiguration;
use crate::models::error::{ConfigError, PlatformError, ScanFailure, SessionError};
use crate::models::state::{ScanPhase, SessionSnapshot};
use crate::session::capability::{Capability, CapabilityProbe};
use crate::session::permission::PermissionNegotiator;
use crate::session::surface::{CameraSurfaceController, SurfaceGuard};
use crate::traits::scan_backend::{DecodeRequest, ScanBackend};
use crate::traits::scan_delegate::ScanDelegate;

/// Internal mutable session state, protected by `parking_lot::Mutex`.
///
/// Never held across an `.await`.
struct SessionState {
    phase: ScanPhase,
    permission_granted: Option<bool>,
    last_result: Option<ScanPayload>,
    last_error: Option<ScanFailure>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: ScanPhase::Idle,
            permission_granted: None,
            last_result: None,
            last_error: None,
        }
    }

    fn clear_outcome(&mut self) {
        self.last_result = None;
        self.last_error = None;
    }
}

/// Notification queued under the state lock and dispatched after it is released.
enum SessionEvent {
    Phase(ScanPhase),
    Result(ScanPayload),
    Error(ScanFailure),
    Closed,
}

/// How a scan attempt ended.
enum Settlement {
    Succeeded(ScanPayload),
    Failed(ScanFailure),
    /// Decode returned nothing usable or was cancelled. Back to idle.
    Dismissed,
}

/// Barcode scan session orchestrator.
///
/// Sequences capability probe, permission negotiation, camera surface
/// activation and decode behind a small `start_scan` / `reset` / `close`
/// contract. Backend-agnostic via the `ScanBackend` trait.
///
/// ```text
/// start_scan → [CapabilityProbe] → [PermissionNegotiator] → [CameraSurface + decode]
///                    ↓ unsupported          ↓ denied                ↓
///                  failed                 failed        succeeded / idle / failed
/// ```
///
/// `start_scan` borrows the session immutably, so the host can call `close`
/// while an attempt is suspended. A closed session absorbs late completions.
pub struct ScanSession {
    id: Uuid,
    backend: Arc<dyn ScanBackend>,
    probe: CapabilityProbe,
    negotiator: PermissionNegotiator,
    surface: Arc<CameraSurfaceController>,
    config: ScanConfiguration,
    delegate: Option<Arc<dyn ScanDelegate>>,
    state: Mutex<SessionState>,
    // Orders delegate callbacks across threads. Reentrant so a delegate may
    // call back into the session (e.g. close from on_result).
    dispatch_lock: ReentrantMutex<()>,
}

impl ScanSession {
    pub fn new(backend: Arc<dyn ScanBackend>) -> Self {
        let id = Uuid::new_v4();
        log::debug!("[scan {}] session created", id);
        Self {
            id,
            probe: CapabilityProbe::new(Arc::clone(&backend), id),
            negotiator: PermissionNegotiator::new(Arc::clone(&backend), id),
            surface: Arc::new(CameraSurfaceController::new(Arc::clone(&backend), id)),
            backend,
            config: ScanConfiguration::default(),
            delegate: None,
            state: Mutex::new(SessionState::new()),
            dispatch_lock: ReentrantMutex::new(()),
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn ScanDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Replace the configuration used when `start_scan` gets `None`.
    pub fn set_configuration(&mut self, config: ScanConfiguration) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn configuration(&self) -> &ScanConfiguration {
        &self.config
    }

    pub fn phase(&self) -> ScanPhase {
        self.state.lock().phase
    }

    pub fn last_result(&self) -> Option<ScanPayload> {
        self.state.lock().last_result.clone()
    }

    pub fn last_error(&self) -> Option<ScanFailure> {
        self.state.lock().last_error.clone()
    }

    pub fn surface_active(&self) -> bool {
        let _state = self.state.lock();
        self.surface.is_active()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            phase: state.phase,
            supported: self.probe.cached().map(|c| c.is_supported()),
            permission_granted: state.permission_granted,
            last_result: state.last_result.clone(),
            last_error: state.last_error.clone(),
            surface_active: self.surface.is_active(),
        }
    }

    /// Run one scan attempt: probe → permission → activate + decode.
    ///
    /// Returns the phase the attempt ended in. While another attempt is
    /// outstanding this is a no-op that returns the current phase.
    pub async fn start_scan(
        &self,
        config: Option<ScanConfiguration>,
    ) -> Result<ScanPhase, SessionError> {
        let config = match config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => self.config.clone(),
        };

        let started = self.commit(|s| {
            if s.phase.is_closed() {
                return (Err(SessionError::Closed), vec![]);
            }
            if s.phase.is_in_flight() {
                return (Ok(false), vec![]);
            }
            s.clear_outcome();
            s.phase = ScanPhase::ProbingCapability;
            (Ok(true), vec![SessionEvent::Phase(ScanPhase::ProbingCapability)])
        })?;

        if !started {
            log::debug!("[scan {}] scan already in progress, ignoring start_scan", self.id);
            return Ok(self.phase());
        }

        log::info!(
            "[scan {}] starting scan for formats {:?}",
            self.id,
            config.formats
        );
        let mut attempt = Attempt::new(self);
        Ok(self.run_attempt(&mut attempt, &config).await)
    }

    /// Return to idle after a result or an error.
    pub fn reset(&self) -> Result<(), SessionError> {
        self.commit(|s| match s.phase {
            phase if phase.is_settled() => {
                s.clear_outcome();
                s.phase = ScanPhase::Idle;
                (Ok(()), vec![SessionEvent::Phase(ScanPhase::Idle)])
            }
            ScanPhase::Closed => (Err(SessionError::Closed), vec![]),
            phase => (
                Err(SessionError::InvalidTransition {
                    operation: "reset",
                    phase,
                }),
                vec![],
            ),
        })
    }

    /// Close the session. Idempotent.
    ///
    /// An active surface is deactivated immediately; an in-flight decode is
    /// left to settle and its outcome discarded.
    pub fn close(&self) {
        let closed = self.commit(|s| {
            if s.phase.is_closed() {
                return (false, vec![]);
            }
            self.surface.deactivate();
            s.clear_outcome();
            s.phase = ScanPhase::Closed;
            (
                true,
                vec![SessionEvent::Phase(ScanPhase::Closed), SessionEvent::Closed],
            )
        });

        if closed {
            log::info!("[scan {}] session closed", self.id);
        }
    }

    // --- Internal helpers ---

    async fn run_attempt(&self, attempt: &mut Attempt<'_>, config: &ScanConfiguration) -> ScanPhase {
        if self.probe.probe(config.install_module).await == Capability::Unsupported {
            return attempt.settle(Settlement::Failed(ScanFailure::unsupported()));
        }
        if !attempt.advance(ScanPhase::ProbingCapability, ScanPhase::RequestingPermission) {
            return attempt.abandon();
        }

        let decision = self.negotiator.request_permission().await;
        self.state.lock().permission_granted = Some(decision.is_granted());
        if !decision.is_granted() {
            return attempt.settle(Settlement::Failed(ScanFailure::permission_denied()));
        }

        match attempt.activate_surface() {
            Ok(true) => {}
            Ok(false) => return attempt.abandon(),
            Err(e) => {
                return attempt.settle(Settlement::Failed(ScanFailure::activation_failed(&e)));
            }
        }

        // A delegate may have closed the session from on_phase_changed(Scanning).
        if self.phase().is_closed() {
            return attempt.abandon();
        }

        let request = DecodeRequest::from(config);
        let outcome = self.backend.decode(&request).await;
        attempt.settle(self.interpret(outcome, config))
    }

    fn interpret(
        &self,
        outcome: Result<Vec<DecodedBarcode>, PlatformError>,
        config: &ScanConfiguration,
    ) -> Settlement {
        match outcome {
            Ok(candidates) => match first_accepted(self.id, candidates, config) {
                Some(payload) => Settlement::Succeeded(payload),
                None => {
                    log::debug!("[scan {}] scan returned no usable barcode", self.id);
                    Settlement::Dismissed
                }
            },
            Err(PlatformError::Cancelled) => {
                log::debug!("[scan {}] scan cancelled", self.id);
                Settlement::Dismissed
            }
            Err(e) => {
                log::error!("[scan {}] scan error: {}", self.id, e);
                Settlement::Failed(ScanFailure::scan_error(&e))
            }
        }
    }

    /// Mutate state under the lock, then dispatch the queued events in order.
    fn commit<R>(&self, mutate: impl FnOnce(&mut SessionState) -> (R, Vec<SessionEvent>)) -> R {
        let _dispatching = self.dispatch_lock.lock();
        let (ret, events) = {
            let mut state = self.state.lock();
            mutate(&mut state)
        };

        if let Some(ref delegate) = self.delegate {
            for event in &events {
                match event {
                    SessionEvent::Phase(phase) => delegate.on_phase_changed(*phase),
                    SessionEvent::Result(payload) => delegate.on_result(payload),
                    SessionEvent::Error(failure) => delegate.on_error(failure),
                    SessionEvent::Closed => delegate.on_closed(),
                }
            }
        }
        ret
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        if self.surface.deactivate() {
            log::warn!("[scan {}] session dropped with an active camera surface", self.id);
        }
    }
}

/// Take the first candidate whose format is recognized and requested.
fn first_accepted(
    session_id: Uuid,
    candidates: Vec<DecodedBarcode>,
    config: &ScanConfiguration,
) -> Option<ScanPayload> {
    candidates.into_iter().find_map(|candidate| match candidate.format {
        Some(format) if config.accepts(format) => {
            Some(ScanPayload::new(candidate.raw_value, format))
        }
        other => {
            log::debug!(
                "[scan {}] ignoring barcode with unrecognized or unrequested format {:?}",
                session_id,
                other
            );
            None
        }
    })
}

/// One outstanding `start_scan`.
///
/// Owns the surface guard for the decode stage. If the attempt future is
/// dropped before it settles, `Drop` releases the surface and returns the
/// session to idle.
struct Attempt<'a> {
    session: &'a ScanSession,
    surface: Option<SurfaceGuard>,
    settled: bool,
}

impl<'a> Attempt<'a> {
    fn new(session: &'a ScanSession) -> Self {
        Self {
            session,
            surface: None,
            settled: false,
        }
    }

    /// Move between in-flight phases. `false` if the session left `from`
    /// in the meantime (closed).
    fn advance(&mut self, from: ScanPhase, to: ScanPhase) -> bool {
        self.session.commit(|s| {
            if s.phase != from {
                return (false, vec![]);
            }
            s.phase = to;
            (true, vec![SessionEvent::Phase(to)])
        })
    }

    /// Activate the surface and enter `Scanning` in one step, so the two
    /// never disagree. `Ok(false)` if the session was closed meanwhile.
    fn activate_surface(&mut self) -> Result<bool, PlatformError> {
        let surface = &self.session.surface;
        let (activated, guard) = self.session.commit(|s| {
            if s.phase != ScanPhase::RequestingPermission {
                return ((Ok(false), None), vec![]);
            }
            match surface.activate() {
                Ok(guard) => {
                    s.phase = ScanPhase::Scanning;
                    ((Ok(true), Some(guard)), vec![SessionEvent::Phase(ScanPhase::Scanning)])
                }
                Err(e) => ((Err(e), None), vec![]),
            }
        });
        self.surface = guard;
        activated
    }

    /// Release the surface and record the outcome, unless the session was
    /// closed while the attempt was suspended.
    fn settle(&mut self, settlement: Settlement) -> ScanPhase {
        self.settled = true;
        let guard = self.surface.take();
        let id = self.session.id;

        self.session.commit(move |s| {
            drop(guard);

            if !s.phase.is_in_flight() {
                log::debug!("[scan {}] discarding outcome of abandoned attempt", id);
                return (s.phase, vec![]);
            }

            s.clear_outcome();
            match settlement {
                Settlement::Succeeded(payload) => {
                    log::info!("[scan {}] scanned {} barcode", id, payload.format);
                    s.phase = ScanPhase::Succeeded;
                    s.last_result = Some(payload.clone());
                    (
                        s.phase,
                        vec![
                            SessionEvent::Phase(ScanPhase::Succeeded),
                            SessionEvent::Result(payload),
                        ],
                    )
                }
                Settlement::Failed(failure) => {
                    log::info!("[scan {}] scan failed: {}", id, failure);
                    s.phase = ScanPhase::Failed;
                    s.last_error = Some(failure.clone());
                    (
                        s.phase,
                        vec![
                            SessionEvent::Phase(ScanPhase::Failed),
                            SessionEvent::Error(failure),
                        ],
                    )
                }
                Settlement::Dismissed => {
                    s.phase = ScanPhase::Idle;
                    (s.phase, vec![SessionEvent::Phase(ScanPhase::Idle)])
                }
            }
        })
    }

    /// The session moved on without us (closed). Nothing left to record.
    fn abandon(&mut self) -> ScanPhase {
        self.settled = true;
        let guard = self.surface.take();
        self.session.commit(move |s| {
            drop(guard);
            (s.phase, vec![])
        })
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let guard = self.surface.take();
        let id = self.session.id;
        self.session.commit(move |s| {
            drop(guard);
            if !s.phase.is_in_flight() {
                return ((), vec![]);
            }
            log::debug!("[scan {}] scan attempt dropped before settling", id);
            s.phase = ScanPhase::Idle;
            ((), vec![SessionEvent::Phase(ScanPhase::Idle)])
        });
    }
}
