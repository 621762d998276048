use actix_web::{web, HttpResponse, Responder};
use utoipa::OpenApi;

use crate::openapi::ApiDoc;

#[utoipa::path(
    get,
    path = "/util/health_check",
    tag = "Utility",
    responses(
        (status=200, description= "Server is running", body= String),
    )
)]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("Running Server")
}

pub async fn openapi_json() -> impl Responder {
    web::Json(ApiDoc::openapi())
}
