use crate::routes::util::handlers::openapi_json;
use crate::routes::{order_route, util_route};
use actix_web::web;

pub fn main_route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/order").configure(order_route))
        .service(web::scope("/util").configure(util_route))
        .route("/api-docs/openapi.json", web::get().to(openapi_json));
}
