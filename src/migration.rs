use crate::{configuration::get_configuration, database::configure_database_using_sqlx};

#[tracing::instrument(name = "Migrate using Sqlx")]
pub async fn migrate_using_sqlx() -> Result<(), anyhow::Error> {
    let configuration = get_configuration()?;
    configure_database_using_sqlx(&configuration.database).await?;
    Ok(())
}
