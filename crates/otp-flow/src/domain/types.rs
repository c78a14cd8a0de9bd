use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Number of digits in a verification code.
pub const OTP_LEN: usize = 6;

/// Maximum age of a persisted OTP session in milliseconds (5 minutes).
pub const MAX_SESSION_AGE_MS: i64 = 300_000;

/// Seconds a user has to wait before requesting another code.
pub const RESEND_COOLDOWN_SECS: u32 = 30;

/// Whether the flow authenticates an existing account or creates one.
/// Changes pre-check behavior only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMode {
    Login,
    Signup,
}

/// Persisted record of "a challenge was issued for this phone, at this time,
/// for this mode". Survives a flow restart; the confirmation handle does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpSession {
    /// Canonical E.164 phone number.
    pub phone: String,
    /// Creation instant, epoch milliseconds.
    pub timestamp: i64,
    pub mode: FlowMode,
}

impl OtpSession {
    pub fn new(phone: impl Into<String>, mode: FlowMode) -> Self {
        Self {
            phone: phone.into(),
            timestamp: Utc::now().timestamp_millis(),
            mode,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms - self.timestamp >= MAX_SESSION_AGE_MS
    }
}

/// Resumable echo of the code-entry fields: a fixed-length sequence of
/// single-digit slots. Purely a UI convenience, never a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpInput([String; OTP_LEN]);

impl OtpInput {
    pub fn empty() -> Self {
        Self(std::array::from_fn(|_| String::new()))
    }

    /// Set one slot to a digit, or clear it with `None`. Returns `false`
    /// (and leaves the input untouched) for an out-of-range index or a
    /// non-digit character.
    pub fn set(&mut self, index: usize, digit: Option<char>) -> bool {
        let Some(slot) = self.0.get_mut(index) else {
            return false;
        };
        match digit {
            Some(c) if c.is_ascii_digit() => *slot = c.to_string(),
            Some(_) => return false,
            None => slot.clear(),
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }

    pub fn is_complete(&self) -> bool {
        self.0.iter().all(|s| !s.is_empty())
    }

    /// Concatenation of the filled slots, e.g. for submit-on-last-digit.
    pub fn code(&self) -> String {
        self.0.concat()
    }

    pub fn slots(&self) -> &[String; OTP_LEN] {
        &self.0
    }
}

impl Default for OtpInput {
    fn default() -> Self {
        Self::empty()
    }
}
