use std::sync::Arc;

use crate::config::FetchConfig;
use crate::processing::{BacktestEngine, DataFetcher};
use crate::storage::CsvStore;
use crate::tasks::{StatusQueryService, SubmissionService};

/// 共享應用狀態
///
/// 由所有處理器透過 axum State 存取；任務儲存庫與外部協作者
/// 皆以 Arc 共享，不使用全域單例。
#[derive(Clone)]
pub struct AppState {
    pub submission: Arc<SubmissionService>,
    pub status: Arc<StatusQueryService>,
    pub engine: Arc<dyn BacktestEngine>,
    pub fetcher: Arc<dyn DataFetcher>,
    pub fetch_config: FetchConfig,
    pub csv_store: CsvStore,
}
