use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::{FetchConfig, ProcessingConfig};

use super::error::{ProcessingError, ProcessingResult};
use super::report::BacktestReport;
use super::{BacktestEngine, DataFetcher};

/// 子行程協作者
///
/// 以設定的 worker 指令承載實際運算：操作名稱作為第一個參數，
/// JSON 請求寫入標準輸入，JSON 回應從標準輸出讀回。worker 的
/// 非零結束狀態與標準錯誤輸出會轉為 ProcessingError。
pub struct WorkerProcess {
    command: String,
    threads: u32,
}

impl WorkerProcess {
    pub fn new(processing: &ProcessingConfig, fetch: &FetchConfig) -> Self {
        Self {
            command: processing.worker_command.clone(),
            threads: fetch.threads,
        }
    }

    /// 執行一次 worker 操作
    async fn run_op(&self, op: &str, payload: &Value) -> ProcessingResult<Value> {
        debug!("呼叫 worker: command={}, op={}", self.command, op);

        let mut child = Command::new(&self.command)
            .arg(op)
            .env("FETCH_THREADS", self.threads.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ProcessingError::Spawn)?;

        let body = serde_json::to_vec(payload)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&body).await?;
            // 關閉 stdin，讓 worker 讀到 EOF
            drop(stdin);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(ProcessingError::WorkerFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait]
impl BacktestEngine for WorkerProcess {
    async fn run(&self, config: &Value) -> ProcessingResult<BacktestReport> {
        let raw = self.run_op("backtest", config).await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// 空物件表示由 worker 套用其內建的預設回測配置
    fn default_config(&self) -> Value {
        json!({})
    }

    async fn load_rows(&self) -> ProcessingResult<Vec<Map<String, Value>>> {
        let raw = self.run_op("load", &Value::Null).await?;
        Ok(serde_json::from_value(raw)?)
    }
}

#[async_trait]
impl DataFetcher for WorkerProcess {
    async fn update_all(&self) -> ProcessingResult<Value> {
        self.run_op("fetch", &Value::Null).await
    }
}
