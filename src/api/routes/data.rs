use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::data;
use crate::api::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/data/fetch", post(data::fetch_data))
        .route("/data/manipulate", post(data::manipulate_data))
        .route("/data/upload", post(data::upload_csv))
        .route("/stocks", get(data::list_stocks))
}
