//! 外部運算協作者介面模組
//!
//! 閘道不實作回測運算、市場資料抓取等實際處理邏輯，僅透過此模組的
//! trait 介面呼叫外部協作者。預設實作以 worker 子行程承載運算，
//! JSON 走標準輸入輸出。

pub mod error;
pub mod manipulation;
pub mod report;
pub mod worker;

// 重新導出主要類型和結構
pub use error::{ProcessingError, ProcessingResult};
pub use manipulation::{manipulate_rows, ManipulationConfig};
pub use report::BacktestReport;
pub use worker::WorkerProcess;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;

#[cfg(test)]
use mockall::automock;

use crate::config::FetchConfig;

/// 回測運算協作者
///
/// 實際的策略邏輯、指標計算與交易模擬都在協作者內部，
/// 閘道對配置與結果一律不加詮釋。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BacktestEngine: Send + Sync {
    /// 以指定配置執行一次回測
    async fn run(&self, config: &Value) -> ProcessingResult<BacktestReport>;

    /// 呼叫端未提供配置時使用的預設配置
    fn default_config(&self) -> Value;

    /// 載入資料操作端點所使用的資料列
    async fn load_rows(&self) -> ProcessingResult<Vec<Map<String, Value>>>;
}

/// 市場資料抓取協作者
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DataFetcher: Send + Sync {
    /// 觸發一次完整的資料更新
    async fn update_all(&self) -> ProcessingResult<Value>;
}

/// 以重試策略觸發資料抓取
///
/// 最多嘗試 retry_total 次，退避間隔自 backoff_secs 起每次加倍。
pub async fn fetch_with_retry(
    fetcher: &dyn DataFetcher,
    config: &FetchConfig,
) -> ProcessingResult<Value> {
    let attempts = config.retry_total.max(1);
    let mut backoff = std::time::Duration::from_secs_f64(config.backoff_secs);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match fetcher.update_all().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                warn!("資料抓取失敗 (第 {}/{} 次): {}", attempt, attempts, e);
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| ProcessingError::Execution("data fetch was never attempted".into())))
}
