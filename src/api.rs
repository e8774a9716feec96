// api.rs - API服務模組，宣告子模組
//
// API服務模組提供閘道的對外接口，實現：
// - RESTful API接口與路由
// - 共享應用狀態
// - 統一的錯誤回應格式

/// REST API實現
pub mod rest;
/// API錯誤回應
pub mod error;
/// 共享應用狀態
pub mod state;
/// API路由定義
pub mod routes;
/// API處理器模組
pub mod handlers;

pub use error::ApiError;
pub use rest::RestApi;
pub use state::AppState;
