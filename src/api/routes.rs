use axum::Router;

use super::state::AppState;

pub mod backtest;
pub mod data;
pub mod system;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(system::routes())
        .merge(data::routes())
        .merge(backtest::routes())
}
