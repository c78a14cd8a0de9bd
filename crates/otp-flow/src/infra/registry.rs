use anyhow::bail;
use reqwest::Client;
use serde::Deserialize;

use crate::config::RegistryConfig;
use crate::domain::ports::PhoneRegistry;

/// [`PhoneRegistry`] over the backend "phone exists" lookup. Only consulted
/// in login mode, before any provider traffic.
pub struct HttpPhoneRegistry {
    client: Client,
    config: RegistryConfig,
}

#[derive(Deserialize)]
struct ExistsResponse {
    exists: bool,
}

impl HttpPhoneRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

impl PhoneRegistry for HttpPhoneRegistry {
    async fn exists(&self, phone_digits: &str) -> Result<bool, anyhow::Error> {
        let url = format!(
            "{}/users/phone/{phone_digits}",
            self.config.base_url.trim_end_matches('/')
        );
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            bail!("phone lookup returned {}", resp.status());
        }
        let body: ExistsResponse = resp.json().await?;
        Ok(body.exists)
    }
}
