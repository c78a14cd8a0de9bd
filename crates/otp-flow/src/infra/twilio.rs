use reqwest::Client;
use serde::Deserialize;

use crate::config::TwilioConfig;
use crate::domain::ports::OtpProvider;
use crate::error::{ProviderError, ProviderErrorClass};

const VERIFY_BASE: &str = "https://verify.twilio.com/v2";

/// [`OtpProvider`] over the Twilio Verify v2 API. A resend for the same
/// number supersedes the prior pending verification on the Twilio side.
pub struct TwilioVerifyProvider {
    client: Client,
    config: TwilioConfig,
}

/// Opaque handle for one pending verification. Holds the verification SID;
/// never persisted.
#[derive(Debug, Clone)]
pub struct TwilioConfirmation {
    pub sid: String,
    pub to: String,
}

/// Identity payload of an approved verification.
#[derive(Debug, Clone)]
pub struct VerifiedPhone {
    pub phone: String,
}

#[derive(Deserialize)]
struct VerificationResponse {
    sid: String,
    to: String,
    status: String,
}

#[derive(Default, Deserialize)]
struct TwilioErrorBody {
    code: Option<u32>,
    message: Option<String>,
}

/// Map a Twilio error code onto the classes the flow branches on.
/// 20003: authentication/billing problem on the account — operator territory.
/// 20404: the verification no longer exists (expired or already consumed).
fn classify(code: u32) -> ProviderErrorClass {
    match code {
        20003 => ProviderErrorClass::Billing,
        20404 => ProviderErrorClass::Expired,
        _ => ProviderErrorClass::Other,
    }
}

impl TwilioVerifyProvider {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn error_from_response(resp: reqwest::Response) -> ProviderError {
        let status = resp.status();
        let body: TwilioErrorBody = resp.json().await.unwrap_or_default();
        match body.code {
            Some(code) => ProviderError::new(
                code.to_string(),
                body.message.unwrap_or_else(|| "twilio error".to_owned()),
                classify(code),
            ),
            None => ProviderError::other(
                status.as_str().to_owned(),
                body.message.unwrap_or_else(|| "twilio error".to_owned()),
            ),
        }
    }
}

impl OtpProvider for TwilioVerifyProvider {
    type Confirmation = TwilioConfirmation;
    type Identity = VerifiedPhone;

    async fn send(&self, phone_e164: &str) -> Result<TwilioConfirmation, ProviderError> {
        let url = format!(
            "{VERIFY_BASE}/Services/{}/Verifications",
            self.config.verify_service_sid
        );
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", phone_e164), ("Channel", "sms")])
            .send()
            .await
            .map_err(|e| ProviderError::other("REQUEST_FAILED", e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }

        let body: VerificationResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::other("BAD_RESPONSE", e.to_string()))?;
        Ok(TwilioConfirmation {
            sid: body.sid,
            to: body.to,
        })
    }

    async fn confirm(
        &self,
        confirmation: &TwilioConfirmation,
        code: &str,
    ) -> Result<VerifiedPhone, ProviderError> {
        let url = format!(
            "{VERIFY_BASE}/Services/{}/VerificationCheck",
            self.config.verify_service_sid
        );
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("VerificationSid", confirmation.sid.as_str()),
                ("Code", code),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::other("REQUEST_FAILED", e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }

        let body: VerificationResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::other("BAD_RESPONSE", e.to_string()))?;
        if body.status != "approved" {
            return Err(ProviderError::other("INCORRECT_CODE", "incorrect code"));
        }
        Ok(VerifiedPhone { phone: body.to })
    }
}
