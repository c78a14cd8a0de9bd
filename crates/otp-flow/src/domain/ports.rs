#![allow(async_fn_in_trait)]

use std::sync::Arc;

use serde_json::Value;

use crate::error::ProviderError;

/// Persistence key for the serialized [`OtpInput`](crate::domain::types::OtpInput).
pub const OTP_INPUT_KEY: &str = "otp_input";

/// Persistence key for the serialized [`OtpSession`](crate::domain::types::OtpSession).
pub const OTP_SESSION_KEY: &str = "otp_session";

/// Port for the external phone-verification provider, consumed as two
/// operations. `Confirmation` is an opaque capability representing one live
/// challenge; it lives only in process memory and is never persisted.
pub trait OtpProvider: Send + Sync {
    type Confirmation: Send;
    type Identity: Send;

    /// Issue a challenge for a canonical E.164 phone number.
    async fn send(&self, phone_e164: &str) -> Result<Self::Confirmation, ProviderError>;

    /// Submit a user-entered code against a live challenge.
    async fn confirm(
        &self,
        confirmation: &Self::Confirmation,
        code: &str,
    ) -> Result<Self::Identity, ProviderError>;
}

/// Port for the backend phone-registry lookup, used only in login mode.
/// A transport failure here is distinct from a negative existence result.
pub trait PhoneRegistry: Send + Sync {
    async fn exists(&self, phone_digits: &str) -> Result<bool, anyhow::Error>;
}

/// Durable key/value storage for flow state that should survive a restart.
///
/// Loss of this cache only degrades UX, so `save` must not fail outward:
/// implementations swallow and log write failures. Corrupted entries load
/// as absent, not as an error.
pub trait StateStore: Send + Sync {
    fn save(&self, key: &str, value: &Value);
    fn load(&self, key: &str) -> Option<Value>;
    fn remove(&self, key: &str);
    fn clear_all(&self);
}

// Lets a store outlive one flow (and back several), e.g. to hand the same
// store to a replacement flow after a restart.
impl<S: StateStore + ?Sized> StateStore for Arc<S> {
    fn save(&self, key: &str, value: &Value) {
        (**self).save(key, value);
    }

    fn load(&self, key: &str) -> Option<Value> {
        (**self).load(key)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }

    fn clear_all(&self) {
        (**self).clear_all();
    }
}
