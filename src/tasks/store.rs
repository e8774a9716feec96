use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::error::{TaskError, TaskResult};
use super::record::{TaskId, TaskRecord};

/// 任務儲存庫
///
/// 以 DashMap 為後端的併發安全任務表。所有存取都經過 put/get/update
/// 三個原子操作：update 於分片鎖內套用變更，get 於同一鎖內複製快照，
/// 因此讀取端永遠只會看到變更前或變更後的完整記錄。
#[derive(Debug, Default)]
pub struct TaskStore {
    records: DashMap<TaskId, TaskRecord>,
}

impl TaskStore {
    /// 建立空的任務儲存庫
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// 寫入新任務記錄
    ///
    /// 識別碼已存在時回傳 DuplicateId，既有記錄不受影響。
    pub fn put(&self, record: TaskRecord) -> TaskResult<()> {
        match self.records.entry(record.id) {
            Entry::Occupied(_) => Err(TaskError::DuplicateId(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// 取得任務記錄快照
    pub fn get(&self, id: &TaskId) -> TaskResult<TaskRecord> {
        self.records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// 原子地對指定記錄套用狀態轉換
    ///
    /// 同一識別碼的併發 update 在分片鎖上序列化。變更函數失敗時
    /// 記錄保持原狀，錯誤原樣回傳。
    pub fn update<F>(&self, id: &TaskId, mutation: F) -> TaskResult<TaskRecord>
    where
        F: FnOnce(&mut TaskRecord) -> TaskResult<()>,
    {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        mutation(entry.value_mut())?;
        Ok(entry.value().clone())
    }

    /// 移除更新時間早於保留期限的終態記錄，回傳移除筆數
    ///
    /// 非終態記錄不受保留政策影響。
    pub fn purge_terminal_older_than(&self, age: Duration) -> usize {
        let Ok(age) = chrono::Duration::from_std(age) else {
            return 0;
        };
        let cutoff = Utc::now() - age;
        let before = self.records.len();
        self.records
            .retain(|_, record| !(record.status.is_terminal() && record.updated_at < cutoff));
        before - self.records.len()
    }

    /// 目前持有的記錄數
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否為空
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
