use crate::errors::GenericError;
use actix_http::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Serialize, Debug, ToSchema, PartialEq, Eq, Clone, Copy, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    PickedUp,
    InCleaning,
    ReadyForDelivery,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::InCleaning => "IN_CLEANING",
            OrderStatus::ReadyForDelivery => "READY_FOR_DELIVERY",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };

        write!(f, "{}", s)
    }
}

#[derive(Deserialize, Serialize, Debug, ToSchema, PartialEq, Eq, Clone, Copy, sqlx::Type)]
#[sqlx(type_name = "otp_purpose", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpPurpose {
    PickupCustomer,
    HandoverToProvider,
    HandoverToAgent,
    DeliveryCustomer,
}

impl OtpPurpose {
    pub fn description(&self) -> &'static str {
        match self {
            OtpPurpose::PickupCustomer => "pickup",
            OtpPurpose::HandoverToProvider => "handover to the laundry provider",
            OtpPurpose::HandoverToAgent => "handover to the delivery agent",
            OtpPurpose::DeliveryCustomer => "delivery",
        }
    }
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OtpPurpose::PickupCustomer => "PICKUP_CUSTOMER",
            OtpPurpose::HandoverToProvider => "HANDOVER_TO_PROVIDER",
            OtpPurpose::HandoverToAgent => "HANDOVER_TO_AGENT",
            OtpPurpose::DeliveryCustomer => "DELIVERY_CUSTOMER",
        };

        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct UserContact {
    pub user_id: String,
    pub display_name: String,
    pub phone_no: String,
}

#[derive(Debug, Clone)]
pub struct ServiceProvider {
    pub need_of_delivery_agent: bool,
    pub user: UserContact,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: String,
    pub status: OrderStatus,
    pub customer: UserContact,
    pub service_provider: ServiceProvider,
}

impl Order {
    pub fn needs_delivery_agent(&self) -> bool {
        self.service_provider.need_of_delivery_agent
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryAgent {
    pub delivery_agent_id: String,
}

#[derive(Debug)]
pub struct OrderOtp {
    pub id: Uuid,
    pub order_id: String,
    pub purpose: OtpPurpose,
    pub otp_code: SecretString,
    pub phone_no: String,
    pub delivery_agent_id: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub failed_attempts: i32,
}

/// A freshly generated OTP that has not been stored yet.
#[derive(Debug)]
pub struct NewOrderOtp {
    pub id: Uuid,
    pub order_id: String,
    pub purpose: OtpPurpose,
    pub otp_code: SecretString,
    /// Used to greet the recipient in the SMS. Not persisted.
    pub recipient_name: String,
    pub phone_no: String,
    pub delivery_agent_id: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct OrderStatusHistory {
    pub id: Uuid,
    pub order_id: String,
    pub status: OrderStatus,
    pub changed_by: Option<String>,
    pub changed_at: DateTime<Utc>,
}

macro_rules! impl_json_request_extractor {
    ($struct_name:ident) => {
        impl FromRequest for $struct_name {
            type Error = GenericError;
            type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
                let fut = web::Json::<Self>::from_request(req, payload);

                Box::pin(async move {
                    let body = match fut.await {
                        Ok(json) => json.into_inner(),
                        Err(e) => return Err(GenericError::ValidationError(e.to_string())),
                    };
                    body.validate()
                        .map_err(|e| GenericError::ValidationError(e.to_string()))?;
                    Ok(body)
                })
            }
        }
    };
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct AgentOtpVerificationRequest {
    #[validate(length(min = 4, max = 8, message = "OTP must be 4 to 8 characters long"))]
    pub otp: String,
    #[validate(length(min = 1, message = "agent_id is required"))]
    pub agent_id: String,
}

impl_json_request_extractor!(AgentOtpVerificationRequest);

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct DeliveryOtpVerificationRequest {
    #[validate(length(min = 4, max = 8, message = "OTP must be 4 to 8 characters long"))]
    pub otp: String,
    #[validate(length(min = 1, message = "verifier_id is required"))]
    pub verifier_id: String,
}

impl_json_request_extractor!(DeliveryOtpVerificationRequest);

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ResendOtpRequest {
    pub purpose: OtpPurpose,
}

impl_json_request_extractor!(ResendOtpRequest);

#[derive(Serialize, Debug, ToSchema, PartialEq)]
pub struct OrderTransitionData {
    pub order_id: String,
    pub status: OrderStatus,
    pub handover_otp_sent: bool,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct OtpDispatchData {
    pub order_id: String,
    pub purpose: OtpPurpose,
    pub expires_at: DateTime<Utc>,
}
