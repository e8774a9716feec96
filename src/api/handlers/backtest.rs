use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::tasks::{StatusSnapshot, TaskId};

#[derive(Debug, Serialize)]
pub struct RunBacktestResponse {
    pub message: String,
    pub metrics: Value,
    pub trades: Vec<Value>,
    pub equity_curve: Value,
}

#[derive(Debug, Serialize)]
pub struct StartBacktestResponse {
    pub message: String,
    pub task_id: TaskId,
}

/// 解析回測配置，缺省或空物件以協作者的預設配置取代
fn resolve_config(state: &AppState, payload: Option<Json<Value>>) -> Value {
    match payload {
        Some(Json(config))
            if !config.is_null() && !config.as_object().is_some_and(|map| map.is_empty()) =>
        {
            config
        }
        _ => state.engine.default_config(),
    }
}

/// 同步執行回測並直接回傳結果
pub async fn run_backtest(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<Json<RunBacktestResponse>, ApiError> {
    let config = resolve_config(&state, payload);
    let report = state.engine.run(&config).await?;

    Ok(Json(RunBacktestResponse {
        message: "Backtest completed successfully.".to_string(),
        metrics: report.metrics,
        trades: report.trades,
        equity_curve: report.equity_curve,
    }))
}

/// 於背景啟動回測並立即回傳任務識別碼
pub async fn start_backtest(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<Json<StartBacktestResponse>, ApiError> {
    let task_id = state.submission.submit(payload.map(|Json(config)| config))?;

    Ok(Json(StartBacktestResponse {
        message: "Backtest started in the background.".to_string(),
        task_id,
    }))
}

/// 查詢回測任務的狀態與結果
pub async fn backtest_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let snapshot = state.status.query(&task_id)?;
    Ok(Json(snapshot))
}
