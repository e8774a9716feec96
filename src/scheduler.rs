//! 資料抓取排程模組
//!
//! 於設定時區的每個平日 HH:MM 觸發一次資料抓取，
//! 抓取本身套用 processing 模組的重試策略。

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{FetchConfig, SchedulerConfig};
use crate::processing::{fetch_with_retry, DataFetcher};

/// 排程器錯誤類型
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// 無效的時區名稱
    #[error("無效的時區設定: {0}")]
    InvalidTimezone(String),
}

/// 資料抓取排程器
pub struct FetchScheduler {
    timezone: Tz,
    hour: u32,
    minute: u32,
    fetcher: Arc<dyn DataFetcher>,
    fetch_config: FetchConfig,
}

impl FetchScheduler {
    pub fn new(
        config: &SchedulerConfig,
        fetch_config: FetchConfig,
        fetcher: Arc<dyn DataFetcher>,
    ) -> Result<Self, SchedulerError> {
        let timezone = Tz::from_str(&config.timezone)
            .map_err(|_| SchedulerError::InvalidTimezone(config.timezone.clone()))?;

        Ok(Self {
            timezone,
            hour: config.hour,
            minute: config.minute,
            fetcher,
            fetch_config,
        })
    }

    /// 啟動排程迴圈，返回背景任務句柄
    pub fn start(self) -> JoinHandle<()> {
        info!(
            "排程器已啟動，資料抓取將於每個平日 {:02}:{:02} {} 執行",
            self.hour, self.minute, self.timezone
        );
        tokio::spawn(async move { self.run_loop().await })
    }

    async fn run_loop(self) {
        loop {
            let now = Utc::now();
            let next = next_weekday_fire(now.with_timezone(&self.timezone), self.hour, self.minute);
            let wait = (next.with_timezone(&Utc) - now)
                .to_std()
                .unwrap_or_default();
            info!("下一次排程資料抓取: {}", next);
            tokio::time::sleep(wait).await;

            info!("執行排程資料抓取任務...");
            match fetch_with_retry(self.fetcher.as_ref(), &self.fetch_config).await {
                Ok(_) => info!("排程資料抓取任務完成"),
                Err(e) => error!("排程資料抓取任務失敗: {}", e),
            }
        }
    }
}

/// 計算下一個平日觸發時間點
///
/// 週六與週日不觸發；DST 造成的缺口時刻取其後最早的有效時間。
fn next_weekday_fire(now: DateTime<Tz>, hour: u32, minute: u32) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    loop {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            if let Some(naive) = date.and_hms_opt(hour, minute, 0) {
                if let Some(fire) = tz.from_local_datetime(&naive).earliest() {
                    if fire > now {
                        return fire;
                    }
                }
            }
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => return now,
        };
    }
}
