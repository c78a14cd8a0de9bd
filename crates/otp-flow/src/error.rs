use crate::domain::types::OTP_LEN;

/// Coarse classification of a provider-reported failure, used by the flow to
/// pick a branch without parsing provider-specific codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorClass {
    /// Billing/quota not enabled on the provider account. Actionable only by
    /// an operator; surfaced verbatim.
    Billing,
    /// The challenge or code itself expired; the confirmation handle is dead.
    Expired,
    /// Anything else (wrong code, transport failure, ...).
    Other,
}

/// Error produced by an [`OtpProvider`](crate::domain::ports::OtpProvider)
/// adapter: the provider's machine-readable code and message, plus the class
/// the adapter mapped the code onto.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
    pub class: ProviderErrorClass,
}

impl ProviderError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        class: ProviderErrorClass,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            class,
        }
    }

    pub fn other(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, ProviderErrorClass::Other)
    }
}

/// Flow error variants. None of these are fatal: every failure leaves the
/// flow in a well-defined, re-enterable state.
#[derive(Debug, thiserror::Error)]
pub enum OtpFlowError {
    #[error("code must be {} digits", OTP_LEN)]
    InvalidCode,
    #[error("a send is already in flight")]
    SendInFlight,
    #[error("a verify is already in flight")]
    VerifyInFlight,
    #[error("no verification was requested")]
    NoSession,
    #[error("verification session expired")]
    SessionExpired,
    #[error("verification session could not be restored")]
    SessionRestorationFailed,
    #[error("phone number is not registered")]
    UserNotRegistered,
    #[error("phone registration check failed")]
    PhoneCheckFailed(#[source] anyhow::Error),
    #[error("verification billing not enabled: {0}")]
    BillingNotEnabled(String),
    #[error("verification code expired")]
    CodeExpired,
    #[error("{message}")]
    Provider { code: String, message: String },
    #[error("flow is closed")]
    FlowClosed,
}

impl OtpFlowError {
    /// Stable machine-readable code for UI branching.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCode => "INVALID_CODE",
            Self::SendInFlight => "SEND_IN_FLIGHT",
            Self::VerifyInFlight => "VERIFY_IN_FLIGHT",
            Self::NoSession => "NO_SESSION",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::SessionRestorationFailed => "SESSION_RESTORATION_FAILED",
            Self::UserNotRegistered => "USER_NOT_REGISTERED",
            Self::PhoneCheckFailed(_) => "PHONE_CHECK_FAILED",
            Self::BillingNotEnabled(_) => "BILLING_NOT_ENABLED",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::Provider { .. } => "PROVIDER",
            Self::FlowClosed => "FLOW_CLOSED",
        }
    }
}

impl From<ProviderError> for OtpFlowError {
    fn from(e: ProviderError) -> Self {
        match e.class {
            ProviderErrorClass::Billing => Self::BillingNotEnabled(e.message),
            ProviderErrorClass::Expired => Self::CodeExpired,
            ProviderErrorClass::Other => Self::Provider {
                code: e.code,
                message: e.message,
            },
        }
    }
}
