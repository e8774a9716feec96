use thiserror::Error;

use super::record::{TaskId, TaskStatus};

/// 任務子系統錯誤類型
#[derive(Error, Debug)]
pub enum TaskError {
    /// 提交內容驗證錯誤
    #[error("無效的任務提交內容: {0}")]
    Validation(String),

    /// 任務不存在
    #[error("任務不存在: {0}")]
    NotFound(String),

    /// 任務識別碼重複
    #[error("任務識別碼重複: {0}")]
    DuplicateId(TaskId),

    /// 非法的狀態轉換
    #[error("非法的任務狀態轉換: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// 任務執行失敗
    #[error("任務執行失敗: {0}")]
    Execution(String),
}

/// 任務結果類型別名
pub type TaskResult<T> = Result<T, TaskError>;
