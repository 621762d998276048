pub mod commands;
pub mod configuration;
pub mod database;
pub mod errors;
pub mod migration;
pub mod openapi;
pub mod routes;
pub mod schemas;
pub mod sms_client;
pub mod startup;
pub mod telemetry;
pub mod utils;
