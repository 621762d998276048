use config::{self, ConfigError, Environment};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use sqlx::ConnectOptions;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseConfig,
    pub otp: OtpSettings,
    pub sms: SmsSettings,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub service_name: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub username: String,
    pub password: SecretString,
    pub port: u16,
    pub host: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

impl DatabaseConfig {
    pub fn without_db(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db()
            .database(&self.name)
            .log_statements(tracing::log::LevelFilter::Trace)
    }
}

/// Code lengths accepted by the OTP verification request bodies.
pub const OTP_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=8;

/// OTP issuing rules shared by every purpose.
#[derive(Debug, Deserialize, Clone)]
pub struct OtpSettings {
    pub length: usize,
    pub expiry_minutes: i64,
    pub max_attempts: i32,
}

impl OtpSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !OTP_LENGTH_RANGE.contains(&self.length) {
            return Err(ConfigError::Message(format!(
                "otp.length must be between {} and {}, got {}",
                OTP_LENGTH_RANGE.start(),
                OTP_LENGTH_RANGE.end(),
                self.length
            )));
        }
        if self.expiry_minutes <= 0 {
            return Err(ConfigError::Message(
                "otp.expiry_minutes must be positive".to_string(),
            ));
        }
        if self.max_attempts <= 0 {
            return Err(ConfigError::Message(
                "otp.max_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    Http,
    Dummy,
}

#[derive(Debug, Deserialize)]
pub struct SmsSettings {
    pub provider: SmsProvider,
    pub base_url: String,
    pub auth_token: SecretString,
    pub sender_id: String,
    pub timeout_milliseconds: u64,
}

impl SmsSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");
    let builder = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("configuration.yaml"),
        ))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    let settings = builder.try_deserialize::<Settings>()?;
    settings.otp.validate()?;
    Ok(settings)
}
