pub mod errors;
pub mod handlers;
mod models;
pub mod otp;
pub mod repository;
mod routes;
pub mod schemas;
pub mod transition;
pub mod utils;
pub use routes::order_route;
