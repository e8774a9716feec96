use thiserror::Error;

/// 外部運算協作者錯誤類型
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// worker 子行程啟動失敗
    #[error("無法啟動 worker 子行程: {0}")]
    Spawn(#[source] std::io::Error),

    /// worker 輸入輸出錯誤
    #[error("worker 輸入輸出錯誤: {0}")]
    Io(#[from] std::io::Error),

    /// worker 以非零狀態結束
    #[error("worker 以非零狀態結束 (code={code}): {stderr}")]
    WorkerFailed { code: i32, stderr: String },

    /// worker 輸出無法解析
    #[error("無法解析 worker 輸出: {0}")]
    Decode(#[from] serde_json::Error),

    /// 其他執行錯誤
    #[error("{0}")]
    Execution(String),
}

/// 運算結果類型別名
pub type ProcessingResult<T> = Result<T, ProcessingError>;
