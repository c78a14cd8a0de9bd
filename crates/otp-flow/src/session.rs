use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ports::{OTP_SESSION_KEY, StateStore};
use crate::domain::types::{FlowMode, OtpSession};

/// Outcome of restoring the persisted session. `Expired` and `Absent` both
/// mean "no usable session", but the distinction drives different user
/// messaging ("sent too long ago" vs "never sent").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRestore {
    Valid(OtpSession),
    Expired,
    Absent,
}

impl SessionRestore {
    /// The usable session, if any.
    pub fn session(self) -> Option<OtpSession> {
        match self {
            Self::Valid(session) => Some(session),
            Self::Expired | Self::Absent => None,
        }
    }
}

/// Sole owner of [`OtpSession`] read/write/expiry semantics.
///
/// A restored session never implies a live confirmation handle; the flow
/// treats the two as independently-lifecycled state.
pub struct SessionManager<S: StateStore> {
    store: Arc<S>,
}

impl<S: StateStore> SessionManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Write a new session stamped with the current instant, unconditionally
    /// overwriting any prior one (single active flow).
    pub fn create(&self, phone: &str, mode: FlowMode) -> OtpSession {
        let session = OtpSession::new(phone, mode);
        match serde_json::to_value(&session) {
            Ok(value) => self.store.save(OTP_SESSION_KEY, &value),
            Err(e) => warn!(error = %e, "failed to serialize otp session"),
        }
        session
    }

    /// Load the persisted session. An expired session is cleared as a side
    /// effect; a corrupted record is treated as absent.
    pub fn restore(&self) -> SessionRestore {
        let Some(value) = self.store.load(OTP_SESSION_KEY) else {
            return SessionRestore::Absent;
        };
        let Ok(session) = serde_json::from_value::<OtpSession>(value) else {
            debug!("discarding corrupted otp session record");
            self.clear();
            return SessionRestore::Absent;
        };
        if session.is_expired() {
            debug!(phone = %session.phone, "clearing expired otp session");
            self.clear();
            return SessionRestore::Expired;
        }
        SessionRestore::Valid(session)
    }

    pub fn clear(&self) {
        self.store.remove(OTP_SESSION_KEY);
    }
}
