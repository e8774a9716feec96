//! 非同步任務生命週期模組
//!
//! 此模組負責管理回測任務從提交到終態的完整生命週期：
//! 建立任務記錄、併發安全的任務儲存、背景執行與狀態輪詢。
//! 實際的回測運算由 processing 模組的外部協作者承載。

pub mod error;
pub mod executor;
pub mod record;
pub mod status;
pub mod store;
pub mod submission;

// 重新導出主要類型和結構
pub use error::{TaskError, TaskResult};
pub use executor::TaskExecutor;
pub use record::{TaskId, TaskRecord, TaskStatus};
pub use status::{StatusQueryService, StatusSnapshot};
pub use store::TaskStore;
pub use submission::SubmissionService;
