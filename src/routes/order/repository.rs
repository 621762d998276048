use async_trait::async_trait;
use uuid::Uuid;

use super::schemas::{
    DeliveryAgent, NewOrderOtp, Order, OrderOtp, OrderStatus, OrderStatusHistory, OtpPurpose,
};

/// Everything a single OTP-gated transition writes. Applied in one database transaction.
#[derive(Debug)]
pub struct TransitionCommit {
    pub order_id: String,
    pub consumed_otp_id: Uuid,
    /// The OTP is only consumed while its failed attempts stay below this limit.
    pub max_attempts: i32,
    /// Statuses the order passes through, in order. The last one is the final status.
    pub statuses: Vec<OrderStatus>,
    pub changed_by: Option<String>,
    pub issued_otp: Option<NewOrderOtp>,
}

impl TransitionCommit {
    pub fn final_status(&self) -> Option<OrderStatus> {
        self.statuses.last().copied()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    /// The OTP was consumed or locked out by another request between validation and commit.
    OtpAlreadyUsed,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>, anyhow::Error>;

    async fn fetch_delivery_agent(
        &self,
        delivery_agent_id: &str,
    ) -> Result<Option<DeliveryAgent>, anyhow::Error>;

    async fn fetch_active_otp(
        &self,
        order_id: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OrderOtp>, anyhow::Error>;

    /// Counts a mismatch. The counter never moves past `max_attempts`.
    async fn record_failed_otp_attempt(
        &self,
        otp_id: Uuid,
        max_attempts: i32,
    ) -> Result<(), anyhow::Error>;

    /// Stores `otp`, invalidating any active OTP for the same order and purpose.
    async fn save_otp(&self, otp: &NewOrderOtp) -> Result<(), anyhow::Error>;

    async fn commit_transition(
        &self,
        commit: &TransitionCommit,
    ) -> Result<CommitOutcome, anyhow::Error>;

    async fn fetch_status_history(
        &self,
        order_id: &str,
    ) -> Result<Vec<OrderStatusHistory>, anyhow::Error>;
}
