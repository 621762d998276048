use crate::schemas::GenericResponse;
use crate::utils::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

#[allow(clippy::enum_variant_names)]
#[derive(thiserror::Error)]
pub enum OrderTransitionError {
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    UnauthorizedError(String),
    #[error("{0}")]
    DatabaseError(String, anyhow::Error),
    #[error("{0}")]
    NotificationError(String, anyhow::Error),
}

impl std::fmt::Debug for OrderTransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for OrderTransitionError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderTransitionError::NotFoundError(_) => StatusCode::NOT_FOUND,
            OrderTransitionError::ValidationError(_) => StatusCode::BAD_REQUEST,
            OrderTransitionError::UnauthorizedError(_) => StatusCode::UNAUTHORIZED,
            OrderTransitionError::DatabaseError(_, _) => StatusCode::INTERNAL_SERVER_ERROR,
            OrderTransitionError::NotificationError(_, _) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let status_code_str = status_code.as_str();
        let inner_error_msg = match self {
            OrderTransitionError::NotFoundError(message)
            | OrderTransitionError::ValidationError(message)
            | OrderTransitionError::UnauthorizedError(message) => message.to_string(),
            OrderTransitionError::DatabaseError(message, _err)
            | OrderTransitionError::NotificationError(message, _err) => message.to_string(),
        };

        HttpResponse::build(status_code).json(GenericResponse::error(
            &inner_error_msg,
            status_code_str,
            Some(()),
        ))
    }
}
