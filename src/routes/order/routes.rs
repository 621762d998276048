use actix_web::web;

use super::handlers::{
    order_status_history, resend_otp, verify_delivery_otp, verify_handover_otp,
    verify_pickup_otp,
};

pub fn order_route(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{order_id}/otp/pickup/verify").route(web::post().to(verify_pickup_otp)),
    );
    cfg.service(
        web::resource("/{order_id}/otp/handover/verify")
            .route(web::post().to(verify_handover_otp)),
    );
    cfg.service(
        web::resource("/{order_id}/otp/delivery/verify")
            .route(web::post().to(verify_delivery_otp)),
    );
    cfg.service(web::resource("/{order_id}/otp/resend").route(web::post().to(resend_otp)));
    cfg.service(
        web::resource("/{order_id}/status/history").route(web::get().to(order_status_history)),
    );
}
