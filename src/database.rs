use crate::configuration::DatabaseConfig;
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, Connection, Executor, PgConnection, PgPool};

pub fn get_connection_pool(configuration: &DatabaseConfig) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(
            configuration.acquire_timeout,
        ))
        .max_connections(configuration.max_connections)
        .min_connections(configuration.min_connections)
        .connect_lazy_with(configuration.with_db())
}

#[tracing::instrument(name = "Configure database using sqlx", skip(config), fields(database = %config.name))]
pub async fn configure_database_using_sqlx(config: &DatabaseConfig) -> Result<PgPool, anyhow::Error> {
    create_database(config).await?;
    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .context("Failed to connect to Postgres")?;

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .context("Failed to migrate the database")?;
    tracing::info!("Migrations applied to {}", &config.name);

    Ok(connection_pool)
}

#[tracing::instrument(name = "Create database", skip(config), fields(database = %config.name))]
pub async fn create_database(config: &DatabaseConfig) -> Result<(), anyhow::Error> {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .context("Failed to connect to Postgres")?;

    let db_count: Option<i64> =
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM pg_database WHERE datname = $1")
            .bind(&config.name)
            .fetch_optional(&mut connection)
            .await
            .context("Failed to check whether the database exists")?;

    if db_count.unwrap_or(0) > 0 {
        tracing::info!("Database {} already exists.", &config.name);
    } else {
        match connection
            .execute(format!(r#"CREATE DATABASE "{}";"#, config.name).as_str())
            .await
        {
            Ok(_) => tracing::info!("Database {} created.", &config.name),
            // Another process created it between the check and the create.
            Err(e) if is_duplicate_database(&e) => {
                tracing::info!("Database {} already exists.", &config.name)
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to create database")),
        }
    }
    Ok(())
}

fn is_duplicate_database(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == "42P04" || code == "23505")
}
