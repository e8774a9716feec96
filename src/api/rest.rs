// src/api/rest.rs
use axum::http::{header, Method};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use anyhow::Result;
use tracing::info;

use crate::config::ServerConfig;

use super::routes::api_routes;
use super::state::AppState;

pub struct RestApi {
    server_config: ServerConfig,
    state: AppState,
}

impl RestApi {
    pub fn new(server_config: ServerConfig, state: AppState) -> Self {
        Self {
            server_config,
            state,
        }
    }

    pub async fn start(self) -> Result<()> {
        // 解析地址
        let addr = SocketAddr::from((
            self.server_config.host.parse::<std::net::IpAddr>()?,
            self.server_config.port,
        ));

        // 建立應用
        let app = self.build_app();

        info!("Starting REST API server on {}", addr);

        // 啟動服務器
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    fn build_app(&self) -> Router {
        // 建立應用並逐層添加中間件
        api_routes()
            // 追蹤層
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            // CORS
            .layer(self.build_cors_layer())
            // 超時設置
            .layer(TimeoutLayer::new(self.server_config.request_timeout()))
            .with_state(self.state.clone())
    }

    fn build_cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_methods(vec![Method::GET, Method::POST])
            .allow_headers(vec![header::CONTENT_TYPE])
            .allow_origin(Any)
    }
}
