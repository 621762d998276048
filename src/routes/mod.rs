pub mod order;
mod routes;
pub mod util;
pub use order::order_route;
pub use routes::main_route;
pub use util::util_route;
