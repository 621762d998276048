use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use secrecy::ExposeSecret;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::models::{DeliveryAgentModel, OrderModel, OrderOtpModel, OrderStatusHistoryModel};
use super::repository::{CommitOutcome, OrderRepository, TransitionCommit};
use super::schemas::{
    DeliveryAgent, NewOrderOtp, Order, OrderOtp, OrderStatus, OrderStatusHistory, OtpPurpose,
};

#[tracing::instrument(name = "Fetch order by id", skip(pool))]
pub async fn fetch_order_by_id(
    pool: &PgPool,
    order_id: &str,
) -> Result<Option<Order>, anyhow::Error> {
    let row: Option<OrderModel> = sqlx::query_as::<_, OrderModel>(
        r#"SELECT o.order_id, o.status,
            c.user_id AS customer_id, c.first_name AS customer_first_name,
            c.last_name AS customer_last_name, c.phone_no AS customer_phone_no,
            sp.need_of_delivery_agent,
            pu.user_id AS provider_user_id, pu.first_name AS provider_first_name,
            pu.last_name AS provider_last_name, pu.phone_no AS provider_phone_no
        FROM orders AS o
        INNER JOIN users AS c ON c.user_id = o.user_id
        INNER JOIN service_provider AS sp ON sp.service_provider_id = o.service_provider_id
        INNER JOIN users AS pu ON pu.user_id = sp.user_id
        WHERE o.order_id = $1"#,
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch order from database")?;
    Ok(row.map(OrderModel::into_schema))
}

#[tracing::instrument(name = "Fetch delivery agent by id", skip(pool))]
pub async fn fetch_delivery_agent_by_id(
    pool: &PgPool,
    delivery_agent_id: &str,
) -> Result<Option<DeliveryAgent>, anyhow::Error> {
    let row: Option<DeliveryAgentModel> = sqlx::query_as::<_, DeliveryAgentModel>(
        r#"SELECT delivery_agent_id FROM delivery_agent
        WHERE delivery_agent_id = $1"#,
    )
    .bind(delivery_agent_id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch delivery agent from database")?;
    Ok(row.map(DeliveryAgentModel::into_schema))
}

#[tracing::instrument(name = "Fetch active order OTP", skip(pool))]
pub async fn fetch_active_order_otp(
    pool: &PgPool,
    order_id: &str,
    purpose: OtpPurpose,
) -> Result<Option<OrderOtp>, anyhow::Error> {
    let row: Option<OrderOtpModel> = sqlx::query_as::<_, OrderOtpModel>(
        r#"SELECT id, order_id, purpose, otp_code, phone_no, delivery_agent_id,
            generated_at, expires_at, failed_attempts
        FROM order_otp
        WHERE order_id = $1 AND purpose = $2 AND is_used = FALSE
        ORDER BY generated_at DESC
        LIMIT 1"#,
    )
    .bind(order_id)
    .bind(purpose)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch order OTP from database")?;
    Ok(row.map(OrderOtpModel::into_schema))
}

#[tracing::instrument(name = "Increment failed OTP attempts", skip(pool))]
pub async fn increment_failed_otp_attempt(
    pool: &PgPool,
    otp_id: Uuid,
    max_attempts: i32,
) -> Result<(), anyhow::Error> {
    sqlx::query(
        r#"UPDATE order_otp SET failed_attempts = failed_attempts + 1
        WHERE id = $1 AND failed_attempts < $2"#,
    )
    .bind(otp_id)
    .bind(max_attempts)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        anyhow::Error::new(e).context("A database failure occurred while recording OTP attempt")
    })?;
    Ok(())
}

#[tracing::instrument(name = "Invalidate active order OTPs", skip(transaction))]
async fn invalidate_active_order_otps(
    transaction: &mut Transaction<'_, Postgres>,
    order_id: &str,
    purpose: OtpPurpose,
) -> Result<(), anyhow::Error> {
    let query = sqlx::query(
        r#"UPDATE order_otp SET is_used = TRUE
        WHERE order_id = $1 AND purpose = $2 AND is_used = FALSE"#,
    )
    .bind(order_id)
    .bind(purpose);
    query.execute(&mut **transaction).await.map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        anyhow::Error::new(e).context("A database failure occurred while invalidating OTPs")
    })?;
    Ok(())
}

#[tracing::instrument(name = "Insert order OTP", skip(transaction, otp), fields(otp_id = %otp.id))]
async fn insert_order_otp(
    transaction: &mut Transaction<'_, Postgres>,
    otp: &NewOrderOtp,
) -> Result<(), anyhow::Error> {
    let query = sqlx::query(
        r#"INSERT INTO order_otp (id, order_id, purpose, otp_code, phone_no, delivery_agent_id,
            generated_at, expires_at, failed_attempts, is_used)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, FALSE)"#,
    )
    .bind(otp.id)
    .bind(&otp.order_id)
    .bind(otp.purpose)
    .bind(otp.otp_code.expose_secret())
    .bind(&otp.phone_no)
    .bind(otp.delivery_agent_id.as_deref())
    .bind(otp.generated_at)
    .bind(otp.expires_at);
    query.execute(&mut **transaction).await.map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        anyhow::Error::new(e).context("A database failure occurred while saving OTP")
    })?;
    Ok(())
}

#[tracing::instrument(name = "Save order OTP", skip(pool, otp), fields(order_id = %otp.order_id, purpose = %otp.purpose))]
pub async fn save_order_otp(pool: &PgPool, otp: &NewOrderOtp) -> Result<(), anyhow::Error> {
    let mut transaction = pool
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;
    invalidate_active_order_otps(&mut transaction, &otp.order_id, otp.purpose).await?;
    insert_order_otp(&mut transaction, otp).await?;
    transaction
        .commit()
        .await
        .context("Failed to commit SQL transaction to store OTP")?;
    Ok(())
}

/// Marks the OTP as used. Returns `false` when it had already been consumed or
/// ran out of attempts.
#[tracing::instrument(name = "Consume order OTP", skip(transaction))]
async fn consume_order_otp(
    transaction: &mut Transaction<'_, Postgres>,
    otp_id: Uuid,
    max_attempts: i32,
) -> Result<bool, anyhow::Error> {
    let query = sqlx::query(
        r#"UPDATE order_otp SET is_used = TRUE
        WHERE id = $1 AND is_used = FALSE AND failed_attempts < $2"#,
    )
    .bind(otp_id)
    .bind(max_attempts);
    let result = query.execute(&mut **transaction).await.map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        anyhow::Error::new(e).context("A database failure occurred while consuming OTP")
    })?;
    Ok(result.rows_affected() == 1)
}

#[tracing::instrument(name = "Update order status", skip(transaction))]
async fn update_order_status(
    transaction: &mut Transaction<'_, Postgres>,
    order_id: &str,
    status: OrderStatus,
) -> Result<(), anyhow::Error> {
    let query = sqlx::query(r#"UPDATE orders SET status = $1, updated_at = $2 WHERE order_id = $3"#)
        .bind(status)
        .bind(Utc::now())
        .bind(order_id);
    query.execute(&mut **transaction).await.map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        anyhow::Error::new(e).context("A database failure occurred while updating order status")
    })?;
    Ok(())
}

#[tracing::instrument(name = "Save order status history", skip(transaction))]
async fn save_order_status_history(
    transaction: &mut Transaction<'_, Postgres>,
    order_id: &str,
    status: OrderStatus,
    changed_by: Option<&str>,
) -> Result<(), anyhow::Error> {
    let query = sqlx::query(
        r#"INSERT INTO order_status_history (id, order_id, status, changed_by, changed_at)
        VALUES ($1, $2, $3, $4, $5)"#,
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(status)
    .bind(changed_by)
    .bind(Utc::now());
    query.execute(&mut **transaction).await.map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        anyhow::Error::new(e).context("A database failure occurred while saving status history")
    })?;
    Ok(())
}

#[tracing::instrument(name = "Commit order transition", skip(pool, commit), fields(order_id = %commit.order_id))]
pub async fn commit_order_transition(
    pool: &PgPool,
    commit: &TransitionCommit,
) -> Result<CommitOutcome, anyhow::Error> {
    let mut transaction = pool
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;

    if !consume_order_otp(&mut transaction, commit.consumed_otp_id, commit.max_attempts).await? {
        transaction
            .rollback()
            .await
            .context("Failed to roll back SQL transaction")?;
        return Ok(CommitOutcome::OtpAlreadyUsed);
    }

    if let Some(final_status) = commit.final_status() {
        update_order_status(&mut transaction, &commit.order_id, final_status).await?;
    }
    for status in &commit.statuses {
        save_order_status_history(
            &mut transaction,
            &commit.order_id,
            *status,
            commit.changed_by.as_deref(),
        )
        .await?;
    }
    if let Some(otp) = &commit.issued_otp {
        invalidate_active_order_otps(&mut transaction, &otp.order_id, otp.purpose).await?;
        insert_order_otp(&mut transaction, otp).await?;
    }

    transaction
        .commit()
        .await
        .context("Failed to commit SQL transaction to apply order transition")?;
    Ok(CommitOutcome::Applied)
}

#[tracing::instrument(name = "Fetch order status history", skip(pool))]
pub async fn fetch_order_status_history(
    pool: &PgPool,
    order_id: &str,
) -> Result<Vec<OrderStatusHistory>, anyhow::Error> {
    let rows: Vec<OrderStatusHistoryModel> = sqlx::query_as::<_, OrderStatusHistoryModel>(
        r#"SELECT id, order_id, status, changed_by, changed_at FROM order_status_history
        WHERE order_id = $1
        ORDER BY entry_no ASC"#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch order status history from database")?;
    Ok(rows
        .into_iter()
        .map(OrderStatusHistoryModel::into_schema)
        .collect())
}

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>, anyhow::Error> {
        fetch_order_by_id(&self.pool, order_id).await
    }

    async fn fetch_delivery_agent(
        &self,
        delivery_agent_id: &str,
    ) -> Result<Option<DeliveryAgent>, anyhow::Error> {
        fetch_delivery_agent_by_id(&self.pool, delivery_agent_id).await
    }

    async fn fetch_active_otp(
        &self,
        order_id: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OrderOtp>, anyhow::Error> {
        fetch_active_order_otp(&self.pool, order_id, purpose).await
    }

    async fn record_failed_otp_attempt(
        &self,
        otp_id: Uuid,
        max_attempts: i32,
    ) -> Result<(), anyhow::Error> {
        increment_failed_otp_attempt(&self.pool, otp_id, max_attempts).await
    }

    async fn save_otp(&self, otp: &NewOrderOtp) -> Result<(), anyhow::Error> {
        save_order_otp(&self.pool, otp).await
    }

    async fn commit_transition(
        &self,
        commit: &TransitionCommit,
    ) -> Result<CommitOutcome, anyhow::Error> {
        commit_order_transition(&self.pool, commit).await
    }

    async fn fetch_status_history(
        &self,
        order_id: &str,
    ) -> Result<Vec<OrderStatusHistory>, anyhow::Error> {
        fetch_order_status_history(&self.pool, order_id).await
    }
}
