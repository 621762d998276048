use crate::helpers::spawn_app;

#[actix_web::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .get(&format!("{}/util/health_check", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(Some(14), response.content_length());
}

#[actix_web::test]
async fn openapi_document_lists_order_endpoints() {
    let app = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .get(&format!("{}/api-docs/openapi.json", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Invalid JSON body.");
    assert!(body["paths"]["/order/{order_id}/otp/pickup/verify"].is_object());
    assert!(body["paths"]["/order/{order_id}/otp/resend"].is_object());
}
