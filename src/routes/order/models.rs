use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sqlx::FromRow;
use uuid::Uuid;

use super::schemas::{
    DeliveryAgent, Order, OrderOtp, OrderStatus, OrderStatusHistory, OtpPurpose,
    ServiceProvider, UserContact,
};

#[derive(Debug, FromRow)]
pub struct OrderModel {
    pub order_id: String,
    pub status: OrderStatus,
    pub customer_id: String,
    pub customer_first_name: String,
    pub customer_last_name: Option<String>,
    pub customer_phone_no: String,
    pub need_of_delivery_agent: Option<bool>,
    pub provider_user_id: String,
    pub provider_first_name: String,
    pub provider_last_name: Option<String>,
    pub provider_phone_no: String,
}

fn display_name(first_name: String, last_name: Option<String>) -> String {
    match last_name {
        Some(last_name) if !last_name.is_empty() => format!("{} {}", first_name, last_name),
        _ => first_name,
    }
}

impl OrderModel {
    pub fn into_schema(self) -> Order {
        Order {
            order_id: self.order_id,
            status: self.status,
            customer: UserContact {
                user_id: self.customer_id,
                display_name: display_name(self.customer_first_name, self.customer_last_name),
                phone_no: self.customer_phone_no,
            },
            service_provider: ServiceProvider {
                need_of_delivery_agent: self.need_of_delivery_agent.unwrap_or(false),
                user: UserContact {
                    user_id: self.provider_user_id,
                    display_name: display_name(
                        self.provider_first_name,
                        self.provider_last_name,
                    ),
                    phone_no: self.provider_phone_no,
                },
            },
        }
    }
}

#[derive(Debug, FromRow)]
pub struct DeliveryAgentModel {
    pub delivery_agent_id: String,
}

impl DeliveryAgentModel {
    pub fn into_schema(self) -> DeliveryAgent {
        DeliveryAgent {
            delivery_agent_id: self.delivery_agent_id,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct OrderOtpModel {
    pub id: Uuid,
    pub order_id: String,
    pub purpose: OtpPurpose,
    pub otp_code: String,
    pub phone_no: String,
    pub delivery_agent_id: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub failed_attempts: i32,
}

impl OrderOtpModel {
    pub fn into_schema(self) -> OrderOtp {
        OrderOtp {
            id: self.id,
            order_id: self.order_id,
            purpose: self.purpose,
            otp_code: SecretString::from(self.otp_code),
            phone_no: self.phone_no,
            delivery_agent_id: self.delivery_agent_id,
            generated_at: self.generated_at,
            expires_at: self.expires_at,
            failed_attempts: self.failed_attempts,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct OrderStatusHistoryModel {
    pub id: Uuid,
    pub order_id: String,
    pub status: OrderStatus,
    pub changed_by: Option<String>,
    pub changed_at: DateTime<Utc>,
}

impl OrderStatusHistoryModel {
    pub fn into_schema(self) -> OrderStatusHistory {
        OrderStatusHistory {
            id: self.id,
            order_id: self.order_id,
            status: self.status,
            changed_by: self.changed_by,
            changed_at: self.changed_at,
        }
    }
}
