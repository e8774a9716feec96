// config.rs - 配置管理模組，宣告子模組
//
// 提供閘道的分層配置：TOML 配置文件、環境變數覆寫與內建預設值，
// 並在啟動前完成配置驗證。

/// 配置加載器
pub mod loader;
/// 配置類型定義
pub mod types;
/// 配置驗證
pub mod validation;

pub use loader::{ConfigLoader, Environment};
pub use types::{
    FetchConfig, GatewayConfig, LogConfig, ProcessingConfig, SchedulerConfig, ServerConfig,
    StorageConfig, TasksConfig,
};
pub use validation::{ValidationError, Validator};

use anyhow::{Context, Result};

/// 初始化並驗證應用配置
pub fn init_config() -> Result<GatewayConfig> {
    let config = GatewayConfig::load().context("配置加載失敗")?;
    config.validate().context("配置驗證失敗")?;
    Ok(config)
}
