use crate::domain::types::RESEND_COOLDOWN_SECS;

/// Tunables for one OTP flow.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Seconds the resend gate stays closed after a successful send.
    pub resend_cooldown_secs: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: RESEND_COOLDOWN_SECS,
        }
    }
}

/// Twilio Verify credentials loaded from environment variables.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Verify service SID (the `VAxxxx...` identifier).
    pub verify_service_sid: String,
}

impl TwilioConfig {
    pub fn from_env() -> Self {
        Self {
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").expect("TWILIO_ACCOUNT_SID"),
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").expect("TWILIO_AUTH_TOKEN"),
            verify_service_sid: std::env::var("TWILIO_VERIFY_SERVICE_SID")
                .expect("TWILIO_VERIFY_SERVICE_SID"),
        }
    }
}

/// Backend phone-registry endpoint configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the backend, e.g. "https://api.example.com".
    pub base_url: String,
}

impl RegistryConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PHONE_REGISTRY_URL").expect("PHONE_REGISTRY_URL"),
        }
    }
}
