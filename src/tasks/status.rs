use std::sync::Arc;

use serde::Serialize;

use crate::processing::BacktestReport;

use super::error::{TaskError, TaskResult};
use super::record::{TaskId, TaskStatus};
use super::store::TaskStore;

/// 任務狀態快照
///
/// 回應輪詢客戶端的唯讀視圖。result 與 error 永遠同時輸出，
/// 未寫入的一方序列化為 null。
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub result: Option<BacktestReport>,
    pub error: Option<String>,
}

/// 任務狀態查詢服務
///
/// 唯讀的公開查詢路徑，可與執行器對同一記錄的變更併發呼叫，
/// 回傳的快照必定是完整寫入的版本。
pub struct StatusQueryService {
    store: Arc<TaskStore>,
}

impl StatusQueryService {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    /// 依識別碼查詢任務狀態
    ///
    /// 未曾發出的識別碼（包含無法解析的字串）一律回報 NotFound。
    pub fn query(&self, raw_id: &str) -> TaskResult<StatusSnapshot> {
        let id = TaskId::parse(raw_id).ok_or_else(|| TaskError::NotFound(raw_id.to_string()))?;
        let record = self.store.get(&id)?;
        Ok(StatusSnapshot {
            task_id: record.id,
            status: record.status,
            result: record.result,
            error: record.error,
        })
    }
}
