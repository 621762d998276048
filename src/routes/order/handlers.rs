use actix_web::web;
use utoipa::TupleUnit;

use crate::schemas::GenericResponse;

use super::errors::OrderTransitionError;
use super::schemas::{
    AgentOtpVerificationRequest, DeliveryOtpVerificationRequest, OrderStatusHistory,
    OrderTransitionData, OtpDispatchData, ResendOtpRequest,
};
use super::transition::OrderTransitionService;

#[utoipa::path(
    post,
    path = "/order/{order_id}/otp/pickup/verify",
    tag = "Order OTP",
    params(("order_id" = String, Path, description = "Order id")),
    request_body(content = AgentOtpVerificationRequest, description = "Request Body"),
    responses(
        (status=200, description= "Pickup confirmed", body= GenericResponse<OrderTransitionData>),
        (status=400, description= "Invalid or expired OTP", body= GenericResponse<TupleUnit>),
        (status=404, description= "Order or delivery agent not found", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "verify pickup otp", skip(service, body), fields(agent_id = %body.agent_id))]
pub async fn verify_pickup_otp(
    order_id: web::Path<String>,
    body: AgentOtpVerificationRequest,
    service: web::Data<OrderTransitionService>,
) -> Result<web::Json<GenericResponse<OrderTransitionData>>, OrderTransitionError> {
    let data = service
        .verify_pickup_otp(&order_id, &body.otp, &body.agent_id)
        .await?;
    Ok(web::Json(GenericResponse::success(
        "Pickup confirmed",
        Some(data),
    )))
}

#[utoipa::path(
    post,
    path = "/order/{order_id}/otp/handover/verify",
    tag = "Order OTP",
    params(("order_id" = String, Path, description = "Order id")),
    request_body(content = AgentOtpVerificationRequest, description = "Request Body"),
    responses(
        (status=200, description= "Handover confirmed", body= GenericResponse<OrderTransitionData>),
        (status=400, description= "Invalid or expired OTP", body= GenericResponse<TupleUnit>),
        (status=404, description= "Order or delivery agent not found", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "verify handover otp", skip(service, body), fields(agent_id = %body.agent_id))]
pub async fn verify_handover_otp(
    order_id: web::Path<String>,
    body: AgentOtpVerificationRequest,
    service: web::Data<OrderTransitionService>,
) -> Result<web::Json<GenericResponse<OrderTransitionData>>, OrderTransitionError> {
    let data = service
        .verify_handover_otp(&order_id, &body.otp, &body.agent_id)
        .await?;
    Ok(web::Json(GenericResponse::success(
        "Handover confirmed",
        Some(data),
    )))
}

#[utoipa::path(
    post,
    path = "/order/{order_id}/otp/delivery/verify",
    tag = "Order OTP",
    params(("order_id" = String, Path, description = "Order id")),
    request_body(content = DeliveryOtpVerificationRequest, description = "Request Body"),
    responses(
        (status=200, description= "Delivery confirmed", body= GenericResponse<OrderTransitionData>),
        (status=400, description= "Invalid or expired OTP", body= GenericResponse<TupleUnit>),
        (status=401, description= "Verifier is not the service provider", body= GenericResponse<TupleUnit>),
        (status=404, description= "Order or delivery agent not found", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "verify delivery otp", skip(service, body), fields(verifier_id = %body.verifier_id))]
pub async fn verify_delivery_otp(
    order_id: web::Path<String>,
    body: DeliveryOtpVerificationRequest,
    service: web::Data<OrderTransitionService>,
) -> Result<web::Json<GenericResponse<OrderTransitionData>>, OrderTransitionError> {
    let data = service
        .verify_delivery_otp(&order_id, &body.otp, &body.verifier_id)
        .await?;
    Ok(web::Json(GenericResponse::success(
        "Delivery confirmed",
        Some(data),
    )))
}

#[utoipa::path(
    post,
    path = "/order/{order_id}/otp/resend",
    tag = "Order OTP",
    params(("order_id" = String, Path, description = "Order id")),
    request_body(content = ResendOtpRequest, description = "Request Body"),
    responses(
        (status=200, description= "OTP sent", body= GenericResponse<OtpDispatchData>),
        (status=400, description= "Unsupported purpose", body= GenericResponse<TupleUnit>),
        (status=404, description= "Order not found", body= GenericResponse<TupleUnit>),
        (status=502, description= "SMS dispatch failed", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "resend otp", skip(service, body), fields(purpose = %body.purpose))]
pub async fn resend_otp(
    order_id: web::Path<String>,
    body: ResendOtpRequest,
    service: web::Data<OrderTransitionService>,
) -> Result<web::Json<GenericResponse<OtpDispatchData>>, OrderTransitionError> {
    let data = service.resend_otp(&order_id, body.purpose).await?;
    Ok(web::Json(GenericResponse::success(
        "OTP sent successfully",
        Some(data),
    )))
}

#[utoipa::path(
    get,
    path = "/order/{order_id}/status/history",
    tag = "Order OTP",
    params(("order_id" = String, Path, description = "Order id")),
    responses(
        (status=200, description= "Order status history", body= GenericResponse<Vec<OrderStatusHistory>>),
        (status=404, description= "Order not found", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "order status history", skip(service))]
pub async fn order_status_history(
    order_id: web::Path<String>,
    service: web::Data<OrderTransitionService>,
) -> Result<web::Json<GenericResponse<Vec<OrderStatusHistory>>>, OrderTransitionError> {
    let data = service.status_history(&order_id).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully fetched order status history",
        Some(data),
    )))
}
