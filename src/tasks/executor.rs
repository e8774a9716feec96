use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::processing::{BacktestEngine, BacktestReport};

use super::record::TaskId;
use super::store::TaskStore;

/// 任務執行器
///
/// 驅動單一任務從 PENDING 走到終態。執行器是任務記錄在執行期間唯一的
/// 變更來源，所有變更都經由儲存庫的原子 update 寫回；任務彼此獨立，
/// 單一任務的失敗不影響其他任務的記錄。
#[derive(Clone)]
pub struct TaskExecutor {
    store: Arc<TaskStore>,
    engine: Arc<dyn BacktestEngine>,
    timeout: Option<Duration>,
}

impl TaskExecutor {
    pub fn new(store: Arc<TaskStore>, engine: Arc<dyn BacktestEngine>) -> Self {
        Self {
            store,
            engine,
            timeout: None,
        }
    }

    /// 設定單一任務的執行時間上限，None 表示不設限
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 派發任務至背景執行，立即返回
    pub fn dispatch(&self, id: TaskId) -> JoinHandle<()> {
        let executor = self.clone();
        tokio::spawn(async move { executor.run(id).await })
    }

    async fn run(&self, id: TaskId) {
        if let Err(e) = self.store.update(&id, |record| record.mark_running()) {
            error!("無法將任務標記為執行中: id={}, error={}", id, e);
            return;
        }
        info!("回測任務開始執行: id={}", id);

        let outcome = self.invoke_engine(id).await;
        let written = match outcome {
            Ok(report) => {
                let result = self.store.update(&id, |record| record.mark_completed(report));
                if result.is_ok() {
                    info!("回測任務已完成: id={}", id);
                }
                result
            }
            Err(message) => {
                error!("回測任務執行失敗: id={}, error={}", id, message);
                self.store.update(&id, |record| record.mark_failed(message))
            }
        };

        if let Err(e) = written {
            error!("無法寫入任務終態: id={}, error={}", id, e);
        }
    }

    /// 呼叫外部運算協作者
    ///
    /// 協作者在巢狀任務中執行，panic 以 JoinError 形式回收為失敗，
    /// 不會讓記錄停留在 RUNNING。
    async fn invoke_engine(&self, id: TaskId) -> Result<BacktestReport, String> {
        let request = match self.store.get(&id) {
            Ok(record) => record.request,
            Err(e) => return Err(format!("無法讀取任務配置: {}", e)),
        };

        let engine = self.engine.clone();
        let mut handle = tokio::spawn(async move { engine.run(&request).await });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    return Err(format!(
                        "backtest timed out after {} seconds",
                        limit.as_secs()
                    ));
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => Err(e.to_string()),
            Err(join_error) => Err(format!("backtest worker panicked: {}", join_error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{MockBacktestEngine, ProcessingError};
    use crate::tasks::record::{TaskRecord, TaskStatus};
    use serde_json::json;

    fn sample_report() -> BacktestReport {
        BacktestReport {
            metrics: json!({"sharpe": 1.1}),
            trades: vec![],
            equity_curve: json!([]),
        }
    }

    fn store_with_pending(request: serde_json::Value) -> (Arc<TaskStore>, TaskId) {
        let store = Arc::new(TaskStore::new());
        let record = TaskRecord::new(TaskId::new(), request);
        let id = record.id;
        store.put(record).unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_successful_run_completes_record() {
        let (store, id) = store_with_pending(json!({"strategy": "x"}));
        let mut engine = MockBacktestEngine::new();
        engine
            .expect_run()
            .withf(|config| config["strategy"] == "x")
            .returning(|_| Ok(sample_report()));

        let executor = TaskExecutor::new(store.clone(), Arc::new(engine));
        executor.dispatch(id).await.unwrap();

        let record = store.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        assert!(record.result.is_some());
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn test_engine_error_fails_record_with_message() {
        let (store, id) = store_with_pending(json!({}));
        let mut engine = MockBacktestEngine::new();
        engine
            .expect_run()
            .returning(|_| Err(ProcessingError::Execution("no market data".into())));

        let executor = TaskExecutor::new(store.clone(), Arc::new(engine));
        executor.dispatch(id).await.unwrap();

        let record = store.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert!(record.result.is_none());
        assert!(record.error.as_deref().unwrap().contains("no market data"));
    }

    #[tokio::test]
    async fn test_engine_panic_fails_record_instead_of_sticking() {
        let (store, id) = store_with_pending(json!({}));
        let mut engine = MockBacktestEngine::new();
        engine
            .expect_run()
            .returning(|_| panic!("worker blew up"));

        let executor = TaskExecutor::new(store.clone(), Arc::new(engine));
        executor.dispatch(id).await.unwrap();

        let record = store.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert!(record.error.as_deref().unwrap().contains("panicked"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timeout_fails_record() {
        let (store, id) = store_with_pending(json!({}));
        let mut engine = MockBacktestEngine::new();
        engine.expect_run().returning(|_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(sample_report())
        });

        let executor = TaskExecutor::new(store.clone(), Arc::new(engine))
            .with_timeout(Some(Duration::from_millis(20)));
        executor.dispatch(id).await.unwrap();

        let record = store.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert!(record.error.as_deref().unwrap().contains("timed out"));
    }
}
