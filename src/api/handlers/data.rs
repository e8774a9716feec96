use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::processing::{fetch_with_retry, manipulate_rows, ManipulationConfig};

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub message: String,
    pub result: Value,
}

#[derive(Serialize)]
pub struct ManipulateResponse {
    pub message: String,
    pub manipulated_data: Vec<Map<String, Value>>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StocksResponse {
    pub stocks: Vec<String>,
}

/// 觸發資料抓取流程
pub async fn fetch_data(State(state): State<AppState>) -> Result<Json<FetchResponse>, ApiError> {
    let result = fetch_with_retry(state.fetcher.as_ref(), &state.fetch_config).await?;

    Ok(Json(FetchResponse {
        message: "Data fetching completed successfully.".to_string(),
        result,
    }))
}

/// 依配置對資料列執行過濾操作
pub async fn manipulate_data(
    State(state): State<AppState>,
    Json(config): Json<ManipulationConfig>,
) -> Result<Json<ManipulateResponse>, ApiError> {
    let rows = state.engine.load_rows().await?;
    let manipulated_data = manipulate_rows(rows, &config);

    Ok(Json(ManipulateResponse {
        message: "Data manipulation completed successfully.".to_string(),
        manipulated_data,
    }))
}

/// 上傳 CSV 檔案至 csv 目錄
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|name| name.to_string())
            .ok_or_else(|| ApiError::internal("Could not upload file: missing filename"))?;
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::internal(format!("Could not upload file: {}", e)))?;

        state
            .csv_store
            .save_upload(&filename, &content)
            .await
            .map_err(|e| ApiError::internal(format!("Could not upload file: {}", e)))?;

        return Ok(Json(UploadResponse {
            message: format!("File '{}' uploaded successfully.", filename),
        }));
    }

    Err(ApiError::internal(
        "Could not upload file: no file field in form",
    ))
}

/// 取得可用股票清單
pub async fn list_stocks(State(state): State<AppState>) -> Result<Json<StocksResponse>, ApiError> {
    let stocks = state.csv_store.list_stocks()?;
    Ok(Json(StocksResponse { stocks }))
}
