use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::processing::BacktestReport;

use super::error::{TaskError, TaskResult};

/// 任務識別碼
///
/// 提交時以 v4 UUID 產生，於行程生命週期內全域唯一且不可變。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// 產生新的任務識別碼
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 解析字串形式的任務識別碼
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 任務狀態
///
/// 序列化為大寫形式（PENDING/RUNNING/COMPLETED/FAILED），與輪詢接口的
/// 狀態字串一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// 已建立，尚未開始執行
    Pending,
    /// 執行中
    Running,
    /// 執行成功，結果已寫入
    Completed,
    /// 執行失敗，錯誤已寫入
    Failed,
}

impl TaskStatus {
    /// 是否為終態
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// 狀態轉換是否合法
    ///
    /// 轉換為單向：PENDING -> RUNNING -> {COMPLETED | FAILED}，
    /// 終態不允許任何後續轉換。
    fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// 任務記錄
///
/// 追蹤單一任務的完整生命週期。記錄由任務儲存庫獨佔持有，
/// 執行期間僅由指派的執行器透過儲存庫的原子 update 變更。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub status: TaskStatus,
    /// 提交時的原始任務配置，提交後不可變
    pub request: Value,
    /// 僅於 COMPLETED 時存在
    pub result: Option<BacktestReport>,
    /// 僅於 FAILED 時存在，保證非空
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// 建立處於 PENDING 狀態的新任務記錄
    pub fn new(id: TaskId, request: Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: TaskStatus::Pending,
            request,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 標記為執行中
    pub fn mark_running(&mut self) -> TaskResult<()> {
        self.transition(TaskStatus::Running)
    }

    /// 標記為執行成功並寫入結果
    pub fn mark_completed(&mut self, report: BacktestReport) -> TaskResult<()> {
        self.transition(TaskStatus::Completed)?;
        self.result = Some(report);
        Ok(())
    }

    /// 標記為執行失敗並寫入錯誤
    ///
    /// 錯誤訊息保證非空：空字串以固定的後備訊息取代。
    pub fn mark_failed(&mut self, error: impl Into<String>) -> TaskResult<()> {
        self.transition(TaskStatus::Failed)?;
        let message = error.into();
        self.error = Some(if message.is_empty() {
            "task execution failed with no error detail".to_string()
        } else {
            message
        });
        Ok(())
    }

    fn transition(&mut self, next: TaskStatus) -> TaskResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(TaskError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use serde_json::json;

    fn sample_report() -> BacktestReport {
        BacktestReport {
            metrics: json!({"total_return": 1.2}),
            trades: vec![json!({"symbol": "INFY"})],
            equity_curve: json!([100.0, 101.2]),
        }
    }

    #[test]
    fn test_new_record_is_pending_without_result_or_error() {
        let record = TaskRecord::new(TaskId::new(), json!({"strategy": "x"}));
        assert_eq!(record.status, TaskStatus::Pending);
        assert!(record.result.is_none());
        assert!(record.error.is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_full_success_lifecycle() {
        let mut record = TaskRecord::new(TaskId::new(), json!({}));
        record.mark_running().unwrap();
        assert_eq!(record.status, TaskStatus::Running);
        record.mark_completed(sample_report()).unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        assert!(record.result.is_some());
        assert!(record.error.is_none());
    }

    #[test]
    fn test_full_failure_lifecycle() {
        let mut record = TaskRecord::new(TaskId::new(), json!({}));
        record.mark_running().unwrap();
        record.mark_failed("engine exploded").unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert!(record.result.is_none());
        assert_eq!(record.error.as_deref(), Some("engine exploded"));
    }

    #[test]
    fn test_failed_error_is_never_empty() {
        let mut record = TaskRecord::new(TaskId::new(), json!({}));
        record.mark_running().unwrap();
        record.mark_failed("").unwrap();
        assert!(!record.error.as_deref().unwrap().is_empty());
    }

    #[rstest]
    #[case::complete_from_pending(TaskStatus::Pending)]
    #[case::complete_from_completed(TaskStatus::Completed)]
    #[case::complete_from_failed(TaskStatus::Failed)]
    fn test_mark_completed_rejected_outside_running(#[case] status: TaskStatus) {
        let mut record = TaskRecord::new(TaskId::new(), json!({}));
        record.status = status;
        assert_matches!(
            record.mark_completed(sample_report()),
            Err(TaskError::InvalidTransition { .. })
        );
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        let mut record = TaskRecord::new(TaskId::new(), json!({}));
        record.mark_running().unwrap();
        record.mark_completed(sample_report()).unwrap();

        assert_matches!(
            record.mark_running(),
            Err(TaskError::InvalidTransition { .. })
        );
        assert_matches!(
            record.mark_failed("late failure"),
            Err(TaskError::InvalidTransition { .. })
        );
        // 結果不因非法轉換而被覆寫
        assert_eq!(record.status, TaskStatus::Completed);
        assert!(record.result.is_some());
    }

    #[test]
    fn test_status_serializes_in_screaming_case() {
        assert_eq!(
            serde_json::to_value(TaskStatus::Pending).unwrap(),
            json!("PENDING")
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::Completed).unwrap(),
            json!("COMPLETED")
        );
    }

    #[test]
    fn test_task_id_parse_roundtrip() {
        let id = TaskId::new();
        assert_eq!(TaskId::parse(&id.to_string()), Some(id));
        assert_eq!(TaskId::parse("not-a-uuid"), None);
    }
}
