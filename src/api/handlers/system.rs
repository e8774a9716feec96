use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    message: String,
}

/// 根端點，確認 API 正常運作
pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "Welcome to the Backtest Gateway API!".to_string(),
    })
}
