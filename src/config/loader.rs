use config::{Config, ConfigError, Environment as ConfigEnvironment, File};
use std::env;
use std::path::Path;

/// 環境類型枚舉
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// 從環境變數取得當前環境設定
    pub fn from_env() -> Self {
        match env::var("GATEWAY_ENV")
            .unwrap_or_else(|_| "development".into())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// 轉換為配置文件名
    pub fn as_filename(&self) -> &'static str {
        match self {
            Environment::Development => "development.toml",
            Environment::Production => "production.toml",
        }
    }
}

/// 相容文件化的扁平環境變數，映射到配置樹中的對應欄位
const FLAT_ENV_KEYS: &[(&str, &str)] = &[
    ("TIMEZONE", "scheduler.timezone"),
    ("SCHEDULE_HOUR", "scheduler.hour"),
    ("SCHEDULE_MINUTE", "scheduler.minute"),
    ("YFINANCE_THREADS", "fetch.threads"),
    ("HTTP_RETRY_TOTAL", "fetch.retry_total"),
    ("HTTP_BACKOFF", "fetch.backoff_secs"),
];

/// 配置加載器，負責根據環境加載適當的配置
pub struct ConfigLoader;

impl ConfigLoader {
    /// 載入指定環境的配置
    pub fn load(env: Environment) -> Result<Config, ConfigError> {
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());
        let config_path = Path::new(&config_dir).join(env.as_filename());

        let mut config_builder = Config::builder();

        // 加載環境特定配置（檔案缺省時使用內建預設值）
        config_builder = config_builder.add_source(File::from(config_path).required(false));

        // 從環境變數加載配置（優先級高於文件配置）
        config_builder = config_builder.add_source(
            ConfigEnvironment::with_prefix("GATEWAY")
                .separator("__")
                .try_parsing(true),
        );

        // 扁平環境變數優先級最高
        for (variable, key) in FLAT_ENV_KEYS {
            config_builder = config_builder.set_override_option(*key, env::var(variable).ok())?;
        }

        // 構建最終配置
        config_builder.build()
    }

    /// 載入當前環境的配置
    pub fn load_current() -> Result<Config, ConfigError> {
        Self::load(Environment::from_env())
    }
}
