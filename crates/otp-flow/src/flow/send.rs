use tracing::{debug, info};

use crate::domain::ports::{OtpProvider, PhoneRegistry, StateStore};
use crate::domain::types::FlowMode;
use crate::error::OtpFlowError;
use crate::flow::{InFlight, OtpFlow};

fn digits_only(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

impl<P, R, S> OtpFlow<P, R, S>
where
    P: OtpProvider,
    R: PhoneRegistry,
    S: StateStore,
{
    /// Issue (or re-issue) an OTP challenge for a canonical E.164 phone.
    ///
    /// On success the confirmation handle is held in memory, a fresh session
    /// is persisted, the input echo is reset and the resend gate is re-armed.
    /// On failure no persisted state changes.
    pub async fn send(&self, phone: &str, mode: FlowMode) -> Result<(), OtpFlowError> {
        let _guard =
            InFlight::acquire(&self.send_in_flight).ok_or(OtpFlowError::SendInFlight)?;
        if !self.is_active() {
            return Err(OtpFlowError::FlowClosed);
        }

        if mode == FlowMode::Login {
            match self.registry.exists(&digits_only(phone)).await {
                Ok(true) => {}
                Ok(false) => return Err(OtpFlowError::UserNotRegistered),
                Err(e) => return Err(OtpFlowError::PhoneCheckFailed(e)),
            }
        }

        let confirmation = match self.provider.send(phone).await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                debug!(code = %e.code, class = ?e.class, "provider send failed");
                return Err(e.into());
            }
        };

        // A late-arriving result for a torn-down flow must not mutate state.
        if !self.is_active() {
            return Err(OtpFlowError::FlowClosed);
        }

        *self.confirmation.lock().unwrap() = Some(confirmation);
        self.sessions.create(phone, mode);
        self.clear_input();
        self.timer().reset(self.config.resend_cooldown_secs);
        info!(?mode, "verification code sent");
        Ok(())
    }
}
