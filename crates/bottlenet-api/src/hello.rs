use axum::Json;

use bottlenet_types::api::HelloResponse;

pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from Bottlenet!".to_string(),
    })
}

pub async fn health() -> &'static str {
    "ok"
}
