use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use super::errors::OrderTransitionError;
use super::repository::OrderRepository;
use super::schemas::{DeliveryAgent, NewOrderOtp, Order, OrderOtp, OtpPurpose, UserContact};
use crate::configuration::OtpSettings;
use crate::sms_client::GenericSmsService;
use crate::utils::mask_phone_no;

pub fn generate_otp_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

fn otp_message(otp: &NewOrderOtp, expiry_minutes: i64) -> String {
    format!(
        "Hi {}, {} is your SmartLaundry OTP for {} of order {}. It is valid for {} minutes. Do not share it with anyone.",
        otp.recipient_name,
        otp.otp_code.expose_secret(),
        otp.purpose.description(),
        otp.order_id,
        expiry_minutes
    )
}

pub struct OrderOtpService {
    repository: Arc<dyn OrderRepository>,
    sms_client: Arc<dyn GenericSmsService>,
    settings: OtpSettings,
}

impl OrderOtpService {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        sms_client: Arc<dyn GenericSmsService>,
        settings: OtpSettings,
    ) -> Self {
        Self {
            repository,
            sms_client,
            settings,
        }
    }

    pub fn max_attempts(&self) -> i32 {
        self.settings.max_attempts
    }

    pub fn new_order_otp(
        &self,
        order: &Order,
        agent: Option<&DeliveryAgent>,
        purpose: OtpPurpose,
        recipient: &UserContact,
    ) -> NewOrderOtp {
        let generated_at = Utc::now();
        NewOrderOtp {
            id: Uuid::new_v4(),
            order_id: order.order_id.clone(),
            purpose,
            otp_code: SecretString::from(generate_otp_code(self.settings.length)),
            recipient_name: recipient.display_name.clone(),
            phone_no: recipient.phone_no.clone(),
            delivery_agent_id: agent.map(|a| a.delivery_agent_id.clone()),
            generated_at,
            expires_at: generated_at + Duration::minutes(self.settings.expiry_minutes),
        }
    }

    /// Returns the matching active OTP, or `None` when the input is wrong, expired or
    /// the OTP ran out of attempts. The OTP is not consumed here.
    #[tracing::instrument(name = "Validate order OTP", skip(self, order, otp_input), fields(order_id = %order.order_id))]
    pub async fn validate_otp(
        &self,
        order: &Order,
        otp_input: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OrderOtp>, anyhow::Error> {
        let Some(otp) = self
            .repository
            .fetch_active_otp(&order.order_id, purpose)
            .await?
        else {
            tracing::info!("No active OTP found");
            return Ok(None);
        };

        if otp.expires_at <= Utc::now() {
            tracing::info!("OTP has expired");
            return Ok(None);
        }
        if otp.failed_attempts >= self.settings.max_attempts {
            tracing::info!("OTP attempts exhausted");
            return Ok(None);
        }
        if otp.otp_code.expose_secret() != otp_input.trim() {
            self.repository
                .record_failed_otp_attempt(otp.id, self.settings.max_attempts)
                .await?;
            tracing::info!("OTP mismatch");
            return Ok(None);
        }
        Ok(Some(otp))
    }

    #[tracing::instrument(name = "Dispatch order OTP", skip(self, otp), fields(order_id = %otp.order_id, purpose = %otp.purpose))]
    pub async fn send_otp(&self, otp: &NewOrderOtp) -> Result<(), OrderTransitionError> {
        self.sms_client
            .send_text_sms(&otp.phone_no, otp_message(otp, self.settings.expiry_minutes))
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to send OTP to {}: {:?}",
                    mask_phone_no(&otp.phone_no),
                    e
                );
                OrderTransitionError::NotificationError(
                    "Something went wrong while sending the OTP".to_string(),
                    e,
                )
            })
    }

    #[tracing::instrument(name = "Generate and send order OTP", skip(self, order, agent, recipient), fields(order_id = %order.order_id))]
    pub async fn generate_and_send_otp(
        &self,
        order: &Order,
        agent: Option<&DeliveryAgent>,
        purpose: OtpPurpose,
        recipient: &UserContact,
    ) -> Result<NewOrderOtp, OrderTransitionError> {
        let otp = self.new_order_otp(order, agent, purpose, recipient);
        self.repository.save_otp(&otp).await.map_err(|e| {
            OrderTransitionError::DatabaseError(
                "Something went wrong while storing the OTP".to_string(),
                e,
            )
        })?;
        self.send_otp(&otp).await?;
        Ok(otp)
    }
}
