mod send;
mod verify;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::config::FlowConfig;
use crate::domain::ports::{OTP_INPUT_KEY, OtpProvider, PhoneRegistry, StateStore};
use crate::domain::types::OtpInput;
use crate::session::{SessionManager, SessionRestore};
use crate::timer::ResendTimer;

/// RAII reentrancy guard: at most one holder per flag, released on drop so
/// the release is unconditional on every path out of an operation.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One phone-OTP authentication flow: owns the confirmation handle, the
/// in-flight guards, the resend timer and the persisted input echo. All
/// mutable flow state lives here, so concurrent flows (e.g. two windows)
/// stay isolated.
pub struct OtpFlow<P, R, S>
where
    P: OtpProvider,
    R: PhoneRegistry,
    S: StateStore,
{
    pub(crate) provider: P,
    pub(crate) registry: R,
    pub(crate) store: Arc<S>,
    pub(crate) sessions: SessionManager<S>,
    timer: ResendTimer,
    /// The opaque capability for the live challenge. Deliberately separate
    /// from the persisted session: a restart keeps the session record but
    /// loses this handle.
    pub(crate) confirmation: Mutex<Option<P::Confirmation>>,
    input: Mutex<OtpInput>,
    pub(crate) send_in_flight: AtomicBool,
    pub(crate) verify_in_flight: AtomicBool,
    active: AtomicBool,
    pub(crate) config: FlowConfig,
}

impl<P, R, S> OtpFlow<P, R, S>
where
    P: OtpProvider,
    R: PhoneRegistry,
    S: StateStore,
{
    /// Create a flow, resuming any persisted input echo.
    pub fn new(provider: P, registry: R, store: S, config: FlowConfig) -> Self {
        let store = Arc::new(store);
        let input = store
            .load(OTP_INPUT_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        Self {
            provider,
            registry,
            sessions: SessionManager::new(Arc::clone(&store)),
            store,
            timer: ResendTimer::new(),
            confirmation: Mutex::new(None),
            input: Mutex::new(input),
            send_in_flight: AtomicBool::new(false),
            verify_in_flight: AtomicBool::new(false),
            active: AtomicBool::new(true),
            config,
        }
    }

    pub fn timer(&self) -> &ResendTimer {
        &self.timer
    }

    /// Restore the persisted session, e.g. to decide on startup whether to
    /// show the code-entry screen. A valid result does not imply a live
    /// confirmation handle.
    pub fn restore_session(&self) -> SessionRestore {
        self.sessions.restore()
    }

    /// Whether a confirmation handle is currently held in memory.
    pub fn has_confirmation(&self) -> bool {
        self.confirmation.lock().unwrap().is_some()
    }

    pub fn input(&self) -> OtpInput {
        self.input.lock().unwrap().clone()
    }

    /// Mutate one input slot and persist the echo. Out-of-range or
    /// non-digit values are ignored.
    pub fn set_input_digit(&self, index: usize, digit: Option<char>) {
        let mut input = self.input.lock().unwrap();
        if input.set(index, digit) {
            self.persist_input(&input);
        }
    }

    /// User-initiated reset: drop the session, the handle and the input
    /// echo, and disarm the resend gate.
    pub fn reset(&self) {
        self.sessions.clear();
        *self.confirmation.lock().unwrap() = None;
        self.clear_input();
        self.timer.reset(0);
    }

    /// Tear the flow down. In-flight provider calls run to completion but
    /// apply no side effects once the flow is closed.
    pub fn close(&self) {
        self.active.store(false, Ordering::Release);
        self.timer.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn clear_input(&self) {
        let mut input = self.input.lock().unwrap();
        *input = OtpInput::empty();
        self.persist_input(&input);
    }

    fn persist_input(&self, input: &OtpInput) {
        match serde_json::to_value(input) {
            Ok(value) => self.store.save(OTP_INPUT_KEY, &value),
            Err(e) => warn!(error = %e, "failed to serialize otp input"),
        }
    }
}
