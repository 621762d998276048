use crate::configuration::{SmsProvider, SmsSettings};
use crate::utils::mask_phone_no;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::sync::Arc;

#[async_trait]
pub trait GenericSmsService: Send + Sync {
    async fn send_text_sms(&self, to: &str, body: String) -> Result<(), anyhow::Error>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SmsSendRequest<'a> {
    sender_id: &'a str,
    to: &'a str,
    message: &'a str,
}

pub struct HttpSmsClient {
    http_client: Client,
    base_url: String,
    sender_id: String,
    auth_token: SecretString,
}

impl HttpSmsClient {
    #[tracing::instrument(skip(sms_config))]
    pub fn new(sms_config: &SmsSettings) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(sms_config.timeout())
            .build()
            .context("Failed to build SMS HTTP client")?;
        tracing::info!("SMS gateway client created for {}", sms_config.base_url);
        Ok(Self {
            http_client,
            base_url: sms_config.base_url.to_owned(),
            sender_id: sms_config.sender_id.to_owned(),
            auth_token: sms_config.auth_token.clone(),
        })
    }
}

#[async_trait]
impl GenericSmsService for HttpSmsClient {
    #[tracing::instrument(name = "Send SMS", skip(self, body), fields(to = %mask_phone_no(to)))]
    async fn send_text_sms(&self, to: &str, body: String) -> Result<(), anyhow::Error> {
        let payload = SmsSendRequest {
            sender_id: &self.sender_id,
            to,
            message: &body,
        };
        let response = self
            .http_client
            .post(&self.base_url)
            .bearer_auth(self.auth_token.expose_secret())
            .json(&payload)
            .send()
            .await
            .context("Failed to reach SMS gateway")?;

        let status = response.status();
        if !status.is_success() {
            let response_body = response.text().await.unwrap_or_default();
            tracing::error!("SMS gateway rejected message: {} {}", status, response_body);
            return Err(anyhow!("SMS gateway responded with {}", status));
        }
        tracing::info!("SMS sent successfully");
        Ok(())
    }
}

pub struct DummySmsClient {}

impl DummySmsClient {
    pub fn new() -> Self {
        tracing::info!("Using dummy SMS client, messages will only be logged.");
        Self {}
    }
}

impl Default for DummySmsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenericSmsService for DummySmsClient {
    async fn send_text_sms(&self, to: &str, _body: String) -> Result<(), anyhow::Error> {
        tracing::info!("Dummy SMS dispatched to {}", mask_phone_no(to));
        Ok(())
    }
}

pub fn create_sms_client(
    sms_config: &SmsSettings,
) -> Result<Arc<dyn GenericSmsService>, anyhow::Error> {
    let client: Arc<dyn GenericSmsService> = match sms_config.provider {
        SmsProvider::Http => Arc::new(HttpSmsClient::new(sms_config)?),
        SmsProvider::Dummy => Arc::new(DummySmsClient::new()),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::create_sms_client;
    use crate::configuration::{SmsProvider, SmsSettings};
    use secrecy::SecretString;

    fn sms_settings(provider: SmsProvider) -> SmsSettings {
        SmsSettings {
            provider,
            base_url: "http://127.0.0.1:9/sms/send".to_string(),
            auth_token: SecretString::from("token".to_string()),
            sender_id: "SMTLDY".to_string(),
            timeout_milliseconds: 200,
        }
    }

    #[tokio::test]
    async fn test_dummy_sms_client_accepts_messages() {
        let client = create_sms_client(&sms_settings(SmsProvider::Dummy)).unwrap();
        assert!(client
            .send_text_sms("+919800000001", "123456 is your OTP".to_string())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_http_sms_client_reports_unreachable_gateway() {
        let client = create_sms_client(&sms_settings(SmsProvider::Http)).unwrap();
        assert!(client
            .send_text_sms("+919800000001", "123456 is your OTP".to_string())
            .await
            .is_err());
    }
}
