use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::error::{TaskError, TaskResult};
use super::executor::TaskExecutor;
use super::record::{TaskId, TaskRecord};
use super::store::TaskStore;

/// 任務提交服務
///
/// 對外的寫入路徑：驗證提交內容、產生識別碼、寫入 PENDING 記錄並
/// 派發執行器。呼叫返回時記錄必定已存在於儲存庫，執行則是
/// fire-and-forget，不保證已經開始。
pub struct SubmissionService {
    store: Arc<TaskStore>,
    executor: TaskExecutor,
    /// 呼叫端未提供配置時使用的預設配置
    default_config: Value,
}

impl SubmissionService {
    pub fn new(store: Arc<TaskStore>, executor: TaskExecutor, default_config: Value) -> Self {
        Self {
            store,
            executor,
            default_config,
        }
    }

    /// 提交新任務並回傳識別碼
    ///
    /// 提交內容為不透明的 JSON 配置，僅做結構性檢查後原樣傳遞給
    /// 外部運算協作者；缺省或空物件以預設配置取代。
    pub fn submit(&self, payload: Option<Value>) -> TaskResult<TaskId> {
        let request = self.resolve_request(payload)?;

        // v4 識別碼碰撞機率可忽略，但識別碼重複不得外洩，
        // 碰撞時重新產生。
        let id = loop {
            let id = TaskId::new();
            match self.store.put(TaskRecord::new(id, request.clone())) {
                Ok(()) => break id,
                Err(TaskError::DuplicateId(dup)) => {
                    warn!("任務識別碼碰撞，重新產生: id={}", dup);
                }
                Err(e) => return Err(e),
            }
        };

        self.executor.dispatch(id);
        info!("回測任務已提交: id={}", id);
        Ok(id)
    }

    fn resolve_request(&self, payload: Option<Value>) -> TaskResult<Value> {
        match payload {
            None | Some(Value::Null) => Ok(self.default_config.clone()),
            Some(Value::Object(map)) if map.is_empty() => Ok(self.default_config.clone()),
            Some(config @ Value::Object(_)) => Ok(config),
            Some(other) => Err(TaskError::Validation(format!(
                "backtest config must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
