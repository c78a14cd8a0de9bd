use tracing::{debug, info};

use crate::domain::ports::{OtpProvider, PhoneRegistry, StateStore};
use crate::domain::types::OTP_LEN;
use crate::error::{OtpFlowError, ProviderErrorClass};
use crate::flow::{InFlight, OtpFlow};
use crate::session::SessionRestore;

impl<P, R, S> OtpFlow<P, R, S>
where
    P: OtpProvider,
    R: PhoneRegistry,
    S: StateStore,
{
    /// Validate a user-entered code against the live challenge.
    ///
    /// With no handle in memory the persisted session is consulted only to
    /// diagnose *why* verification cannot proceed: never sent, sent too long
    /// ago, or sent recently but the capability was lost to a restart.
    pub async fn verify(&self, code: &str) -> Result<P::Identity, OtpFlowError> {
        if code.len() != OTP_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpFlowError::InvalidCode);
        }

        let _guard =
            InFlight::acquire(&self.verify_in_flight).ok_or(OtpFlowError::VerifyInFlight)?;
        if !self.is_active() {
            return Err(OtpFlowError::FlowClosed);
        }

        let confirmation = self.confirmation.lock().unwrap().take();
        let Some(confirmation) = confirmation else {
            return Err(match self.sessions.restore() {
                SessionRestore::Absent => OtpFlowError::NoSession,
                SessionRestore::Expired => OtpFlowError::SessionExpired,
                // A send succeeded recently, but the handle did not survive
                // the restart. The session record stays so the UI keeps its
                // context; the user has to resend.
                SessionRestore::Valid(_) => OtpFlowError::SessionRestorationFailed,
            });
        };

        match self.provider.confirm(&confirmation, code).await {
            Ok(identity) => {
                if !self.is_active() {
                    return Err(OtpFlowError::FlowClosed);
                }
                self.sessions.clear();
                self.clear_input();
                info!("phone verification succeeded");
                Ok(identity)
            }
            Err(e) if e.class == ProviderErrorClass::Expired => {
                // The challenge is dead; dropping the handle forces a resend
                // instead of another doomed verify. The session record is
                // kept for UI context.
                debug!(code = %e.code, "challenge expired, invalidating handle");
                Err(OtpFlowError::CodeExpired)
            }
            Err(e) => {
                // Put the handle back for a retry, unless a concurrent
                // resend installed a fresh one meanwhile.
                if self.is_active() {
                    let mut slot = self.confirmation.lock().unwrap();
                    if slot.is_none() {
                        *slot = Some(confirmation);
                    }
                }
                Err(e.into())
            }
        }
    }
}
