use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::loader::ConfigLoader;
use super::validation::{ValidationError, ValidationUtils, Validator};

/// 閘道配置結構
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub scheduler: SchedulerConfig,
    pub fetch: FetchConfig,
    pub storage: StorageConfig,
    pub processing: ProcessingConfig,
    pub tasks: TasksConfig,
}

impl GatewayConfig {
    /// 加載當前環境的配置
    pub fn load() -> Result<Self, config::ConfigError> {
        ConfigLoader::load_current()?.try_deserialize()
    }
}

impl Validator for GatewayConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // 驗證各個部分的配置
        self.server.validate()?;
        self.log.validate()?;
        self.scheduler.validate()?;
        self.fetch.validate()?;
        self.storage.validate()?;
        self.processing.validate()?;
        self.tasks.validate()?;

        Ok(())
    }
}

/// 伺服器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 60,
        }
    }
}

impl Validator for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::not_empty(&self.host, "server.host")?;
        ValidationUtils::in_range(self.port, 1, 65535, "server.port")?;
        ValidationUtils::in_range(self.request_timeout_secs, 1, 3600, "server.request_timeout_secs")?;

        Ok(())
    }
}

impl ServerConfig {
    /// 獲取請求超時持續時間
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 日誌配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Validator for LogConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // 驗證日誌級別
        ValidationUtils::one_of(
            &self.level.to_lowercase(),
            &["trace", "debug", "info", "warn", "error"],
            "log.level",
        )?;

        // 驗證日誌格式
        ValidationUtils::one_of(&self.format.to_lowercase(), &["pretty", "json"], "log.format")?;

        Ok(())
    }
}

/// 資料抓取排程配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub timezone: String,
    pub hour: u32,
    pub minute: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timezone: "Asia/Kolkata".to_string(),
            hour: 16,
            minute: 0,
        }
    }
}

impl Validator for SchedulerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::not_empty(&self.timezone, "scheduler.timezone")?;
        ValidationUtils::in_range(self.hour, 0, 23, "scheduler.hour")?;
        ValidationUtils::in_range(self.minute, 0, 59, "scheduler.minute")?;

        Ok(())
    }
}

/// 資料抓取配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub threads: u32,
    pub retry_total: u32,
    pub backoff_secs: f64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            threads: 6,
            retry_total: 5,
            backoff_secs: 1.0,
        }
    }
}

impl Validator for FetchConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::in_range(self.threads, 1, 64, "fetch.threads")?;
        ValidationUtils::in_range(self.retry_total, 1, 100, "fetch.retry_total")?;
        ValidationUtils::in_range(self.backoff_secs, 0.0, 600.0, "fetch.backoff_secs")?;

        Ok(())
    }
}

/// 檔案儲存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub csv_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            csv_dir: "csv".to_string(),
        }
    }
}

impl Validator for StorageConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::not_empty(&self.csv_dir, "storage.csv_dir")?;

        Ok(())
    }
}

/// 外部運算配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub worker_command: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            worker_command: "backtest-worker".to_string(),
        }
    }
}

impl Validator for ProcessingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::not_empty(&self.worker_command, "processing.worker_command")?;

        Ok(())
    }
}

/// 任務生命週期配置
///
/// retention_secs 與 timeout_secs 缺省時分別表示無限保留與不設執行
/// 時間上限，維持文件化的原有行為。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    pub retention_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub sweep_interval_secs: u64,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            retention_secs: None,
            timeout_secs: None,
            sweep_interval_secs: 300,
        }
    }
}

impl Validator for TasksConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(retention) = self.retention_secs {
            ValidationUtils::in_range(retention, 1, u64::MAX, "tasks.retention_secs")?;
        }
        if let Some(timeout) = self.timeout_secs {
            ValidationUtils::in_range(timeout, 1, 86400, "tasks.timeout_secs")?;
        }
        ValidationUtils::in_range(self.sweep_interval_secs, 1, 86400, "tasks.sweep_interval_secs")?;

        Ok(())
    }
}

impl TasksConfig {
    /// 獲取終態記錄保留期限
    pub fn retention(&self) -> Option<Duration> {
        self.retention_secs.map(Duration::from_secs)
    }

    /// 獲取單一任務執行時間上限
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// 獲取清理任務的執行間隔
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
