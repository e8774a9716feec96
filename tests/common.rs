#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use backtest_gateway::processing::{
    BacktestEngine, BacktestReport, DataFetcher, ProcessingError, ProcessingResult,
};
use backtest_gateway::tasks::{
    StatusQueryService, StatusSnapshot, SubmissionService, TaskExecutor, TaskStore,
};

/// Report returned by every successful stub run
pub fn sample_report() -> BacktestReport {
    BacktestReport {
        metrics: json!({"total_return_pct": 12.5, "win_rate": 0.6, "max_drawdown_pct": 4.2}),
        trades: vec![json!({"symbol": "INFY", "entry": 1450.0, "exit": 1502.5, "pnl": 420.0})],
        equity_curve: json!([100000.0, 100180.0, 100420.0]),
    }
}

/// Rows served by the stub engine for manipulation tests
pub fn sample_rows() -> Vec<Map<String, Value>> {
    [
        json!({"symbol": "INFY", "sector": "IT", "close": 1502.5}),
        json!({"symbol": "TCS", "sector": "IT", "close": 3401.0}),
        json!({"symbol": "HDFCBANK", "sector": "Banking", "close": 1688.4}),
    ]
    .into_iter()
    .map(|value| value.as_object().unwrap().clone())
    .collect()
}

/// Backtest engine stub with a fixed outcome and an artificial delay,
/// so tests can observe the PENDING/RUNNING window.
pub struct StubEngine {
    delay: Duration,
    fail_with: Option<String>,
}

impl StubEngine {
    pub fn succeeding() -> Self {
        Self {
            delay: Duration::from_millis(50),
            fail_with: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            delay: Duration::from_millis(50),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl BacktestEngine for StubEngine {
    async fn run(&self, config: &Value) -> ProcessingResult<BacktestReport> {
        tokio::time::sleep(self.delay).await;
        if let Some(message) = &self.fail_with {
            return Err(ProcessingError::Execution(message.clone()));
        }
        // 配置可要求單一任務失敗，其他任務不受影響
        if config["fail"] == true {
            return Err(ProcessingError::Execution("failure requested by config".into()));
        }
        Ok(sample_report())
    }

    fn default_config(&self) -> Value {
        json!({"strategy": "ma_crossover", "short_ma_period": 10, "long_ma_period": 50})
    }

    async fn load_rows(&self) -> ProcessingResult<Vec<Map<String, Value>>> {
        Ok(sample_rows())
    }
}

/// Fetcher stub that fails a configured number of times before succeeding.
pub struct StubFetcher {
    remaining_failures: AtomicUsize,
    pub calls: AtomicUsize,
}

impl StubFetcher {
    pub fn succeeding() -> Self {
        Self::failing_times(0)
    }

    pub fn failing_times(failures: usize) -> Self {
        Self {
            remaining_failures: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DataFetcher for StubFetcher {
    async fn update_all(&self) -> ProcessingResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ProcessingError::Execution("upstream unavailable".into()));
        }
        Ok(json!({"updated_symbols": 500}))
    }
}

/// Builds the full task lifecycle stack around the given engine.
pub fn lifecycle(
    engine: Arc<dyn BacktestEngine>,
) -> (Arc<TaskStore>, SubmissionService, StatusQueryService) {
    let store = Arc::new(TaskStore::new());
    let executor = TaskExecutor::new(store.clone(), engine.clone());
    let default_config = engine.default_config();
    let submission = SubmissionService::new(store.clone(), executor, default_config);
    let status = StatusQueryService::new(store.clone());
    (store, submission, status)
}

/// Polls the status service until the job reaches a terminal state.
pub async fn await_terminal(status: &StatusQueryService, task_id: &str) -> StatusSnapshot {
    for _ in 0..400 {
        let snapshot = status.query(task_id).expect("submitted task must resolve");
        if snapshot.status.is_terminal() {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("task {} never reached a terminal state", task_id);
}
