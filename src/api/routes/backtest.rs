use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::backtest;
use crate::api::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/data/backtest", post(backtest::run_backtest))
        .route("/backtest/start", post(backtest::start_backtest))
        .route("/backtest/status/{task_id}", get(backtest::backtest_status))
}
