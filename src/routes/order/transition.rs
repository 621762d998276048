use std::sync::Arc;

use super::errors::OrderTransitionError;
use super::otp::OrderOtpService;
use super::repository::{CommitOutcome, OrderRepository, TransitionCommit};
use super::schemas::{
    DeliveryAgent, Order, OrderOtp, OrderStatus, OrderStatusHistory, OrderTransitionData,
    OtpDispatchData, OtpPurpose,
};
use crate::configuration::OtpSettings;
use crate::sms_client::GenericSmsService;

const INVALID_OTP_MESSAGE: &str = "Invalid or expired OTP";

/// OTP-gated order lifecycle: pickup, handover to the provider and delivery.
pub struct OrderTransitionService {
    repository: Arc<dyn OrderRepository>,
    otp_service: OrderOtpService,
}

impl OrderTransitionService {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        sms_client: Arc<dyn GenericSmsService>,
        otp_settings: OtpSettings,
    ) -> Self {
        let otp_service = OrderOtpService::new(repository.clone(), sms_client, otp_settings);
        Self {
            repository,
            otp_service,
        }
    }

    async fn get_order(&self, order_id: &str) -> Result<Order, OrderTransitionError> {
        self.repository
            .fetch_order(order_id)
            .await
            .map_err(|e| {
                OrderTransitionError::DatabaseError(
                    "Something went wrong while fetching the order".to_string(),
                    e,
                )
            })?
            .ok_or_else(|| OrderTransitionError::NotFoundError("Order not found".to_string()))
    }

    async fn get_delivery_agent(
        &self,
        delivery_agent_id: &str,
    ) -> Result<DeliveryAgent, OrderTransitionError> {
        self.repository
            .fetch_delivery_agent(delivery_agent_id)
            .await
            .map_err(|e| {
                OrderTransitionError::DatabaseError(
                    "Something went wrong while fetching the delivery agent".to_string(),
                    e,
                )
            })?
            .ok_or_else(|| {
                OrderTransitionError::NotFoundError("Delivery agent not found".to_string())
            })
    }

    async fn validate_otp(
        &self,
        order: &Order,
        otp_input: &str,
        purpose: OtpPurpose,
    ) -> Result<OrderOtp, OrderTransitionError> {
        self.otp_service
            .validate_otp(order, otp_input, purpose)
            .await
            .map_err(|e| {
                OrderTransitionError::DatabaseError(
                    "Something went wrong while validating the OTP".to_string(),
                    e,
                )
            })?
            .ok_or_else(|| OrderTransitionError::ValidationError(INVALID_OTP_MESSAGE.to_string()))
    }

    async fn commit(
        &self,
        order: &Order,
        commit: &TransitionCommit,
    ) -> Result<(), OrderTransitionError> {
        let outcome = self
            .repository
            .commit_transition(commit)
            .await
            .map_err(|e| {
                OrderTransitionError::DatabaseError(
                    "Something went wrong while updating the order status".to_string(),
                    e,
                )
            })?;
        match outcome {
            CommitOutcome::Applied => {
                if let Some(final_status) = commit.final_status() {
                    tracing::info!("Order status moved from {} to {}", order.status, final_status);
                }
                Ok(())
            }
            CommitOutcome::OtpAlreadyUsed => {
                tracing::warn!("OTP was consumed or locked out by a concurrent request");
                Err(OrderTransitionError::ValidationError(
                    INVALID_OTP_MESSAGE.to_string(),
                ))
            }
        }
    }

    #[tracing::instrument(name = "Verify pickup OTP", skip(self, otp_input))]
    pub async fn verify_pickup_otp(
        &self,
        order_id: &str,
        otp_input: &str,
        agent_id: &str,
    ) -> Result<OrderTransitionData, OrderTransitionError> {
        let order = self.get_order(order_id).await?;
        let agent = if order.needs_delivery_agent() {
            Some(self.get_delivery_agent(agent_id).await?)
        } else {
            None
        };
        let otp = self
            .validate_otp(&order, otp_input, OtpPurpose::PickupCustomer)
            .await?;

        match agent {
            Some(agent) => {
                let handover_otp = self.otp_service.new_order_otp(
                    &order,
                    Some(&agent),
                    OtpPurpose::HandoverToProvider,
                    &order.service_provider.user,
                );
                let commit = TransitionCommit {
                    order_id: order.order_id.clone(),
                    consumed_otp_id: otp.id,
                    max_attempts: self.otp_service.max_attempts(),
                    statuses: vec![OrderStatus::PickedUp],
                    changed_by: Some(agent.delivery_agent_id.clone()),
                    issued_otp: Some(handover_otp),
                };
                self.commit(&order, &commit).await?;
                if let Some(handover_otp) = &commit.issued_otp {
                    self.otp_service.send_otp(handover_otp).await?;
                }
                Ok(OrderTransitionData {
                    order_id: order.order_id,
                    status: OrderStatus::PickedUp,
                    handover_otp_sent: true,
                })
            }
            None => {
                // Provider collects the laundry itself, so cleaning starts right away.
                let commit = TransitionCommit {
                    order_id: order.order_id.clone(),
                    consumed_otp_id: otp.id,
                    max_attempts: self.otp_service.max_attempts(),
                    statuses: vec![OrderStatus::PickedUp, OrderStatus::InCleaning],
                    changed_by: None,
                    issued_otp: None,
                };
                self.commit(&order, &commit).await?;
                Ok(OrderTransitionData {
                    order_id: order.order_id,
                    status: OrderStatus::InCleaning,
                    handover_otp_sent: false,
                })
            }
        }
    }

    #[tracing::instrument(name = "Verify handover OTP", skip(self, otp_input))]
    pub async fn verify_handover_otp(
        &self,
        order_id: &str,
        otp_input: &str,
        agent_id: &str,
    ) -> Result<OrderTransitionData, OrderTransitionError> {
        let order = self.get_order(order_id).await?;
        let agent = self.get_delivery_agent(agent_id).await?;
        let otp = self
            .validate_otp(&order, otp_input, OtpPurpose::HandoverToProvider)
            .await?;

        let commit = TransitionCommit {
            order_id: order.order_id.clone(),
            consumed_otp_id: otp.id,
            max_attempts: self.otp_service.max_attempts(),
            statuses: vec![OrderStatus::InCleaning],
            changed_by: Some(agent.delivery_agent_id),
            issued_otp: None,
        };
        self.commit(&order, &commit).await?;
        Ok(OrderTransitionData {
            order_id: order.order_id,
            status: OrderStatus::InCleaning,
            handover_otp_sent: false,
        })
    }

    #[tracing::instrument(name = "Verify delivery OTP", skip(self, otp_input))]
    pub async fn verify_delivery_otp(
        &self,
        order_id: &str,
        otp_input: &str,
        verifier_id: &str,
    ) -> Result<OrderTransitionData, OrderTransitionError> {
        let order = self.get_order(order_id).await?;
        if order.needs_delivery_agent() {
            self.get_delivery_agent(verifier_id).await?;
        } else if order.service_provider.user.user_id != verifier_id {
            return Err(OrderTransitionError::UnauthorizedError(
                "Unauthorized: only the service provider can confirm delivery for this order."
                    .to_string(),
            ));
        }
        let otp = self
            .validate_otp(&order, otp_input, OtpPurpose::DeliveryCustomer)
            .await?;

        let commit = TransitionCommit {
            order_id: order.order_id.clone(),
            consumed_otp_id: otp.id,
            max_attempts: self.otp_service.max_attempts(),
            statuses: vec![OrderStatus::Delivered],
            changed_by: Some(verifier_id.to_string()),
            issued_otp: None,
        };
        self.commit(&order, &commit).await?;
        Ok(OrderTransitionData {
            order_id: order.order_id,
            status: OrderStatus::Delivered,
            handover_otp_sent: false,
        })
    }

    #[tracing::instrument(name = "Resend order OTP", skip(self))]
    pub async fn resend_otp(
        &self,
        order_id: &str,
        purpose: OtpPurpose,
    ) -> Result<OtpDispatchData, OrderTransitionError> {
        let order = self.get_order(order_id).await?;
        let recipient = match purpose {
            OtpPurpose::PickupCustomer | OtpPurpose::DeliveryCustomer => &order.customer,
            OtpPurpose::HandoverToProvider => &order.service_provider.user,
            OtpPurpose::HandoverToAgent => {
                return Err(OrderTransitionError::ValidationError(
                    "Unsupported purpose".to_string(),
                ))
            }
        };

        let otp = self
            .otp_service
            .generate_and_send_otp(&order, None, purpose, recipient)
            .await?;
        Ok(OtpDispatchData {
            order_id: order.order_id,
            purpose,
            expires_at: otp.expires_at,
        })
    }

    #[tracing::instrument(name = "Fetch order status history", skip(self))]
    pub async fn status_history(
        &self,
        order_id: &str,
    ) -> Result<Vec<OrderStatusHistory>, OrderTransitionError> {
        let order = self.get_order(order_id).await?;
        self.repository
            .fetch_status_history(&order.order_id)
            .await
            .map_err(|e| {
                OrderTransitionError::DatabaseError(
                    "Something went wrong while fetching the status history".to_string(),
                    e,
                )
            })
    }
}
