use crate::routes::order::schemas::{
    AgentOtpVerificationRequest, DeliveryOtpVerificationRequest, OrderStatus, OrderStatusHistory,
    OrderTransitionData, OtpDispatchData, OtpPurpose, ResendOtpRequest,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::order::handlers::verify_pickup_otp,
        crate::routes::order::handlers::verify_handover_otp,
        crate::routes::order::handlers::verify_delivery_otp,
        crate::routes::order::handlers::resend_otp,
        crate::routes::order::handlers::order_status_history,
        crate::routes::util::handlers::health_check,
    ),
    components(schemas(
        OrderStatus,
        OtpPurpose,
        OrderStatusHistory,
        OrderTransitionData,
        OtpDispatchData,
        AgentOtpVerificationRequest,
        DeliveryOtpVerificationRequest,
        ResendOtpRequest,
    )),
    tags(
        (name = "Order OTP", description = "OTP gated laundry order transitions"),
        (name = "Utility", description = "Service utilities")
    ),
)]
pub struct ApiDoc {}
