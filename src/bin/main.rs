use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use backtest_gateway::api::rest::RestApi;
use backtest_gateway::api::state::AppState;
use backtest_gateway::config;
use backtest_gateway::config::LogConfig;
use backtest_gateway::processing::{BacktestEngine, WorkerProcess};
use backtest_gateway::scheduler::FetchScheduler;
use backtest_gateway::storage::CsvStore;
use backtest_gateway::tasks::{
    StatusQueryService, SubmissionService, TaskExecutor, TaskStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化配置
    let app_config = config::init_config()?;

    // 初始化日誌系統
    init_logging(&app_config.log)?;

    // 建立 csv 目錄（如果不存在）
    let csv_store = CsvStore::new(&app_config.storage.csv_dir);
    csv_store.ensure_dir().await?;

    // 建立外部運算協作者
    let worker = Arc::new(WorkerProcess::new(&app_config.processing, &app_config.fetch));
    let default_config = worker.default_config();

    // 建立任務儲存庫與生命週期服務
    let store = Arc::new(TaskStore::new());
    let executor =
        TaskExecutor::new(store.clone(), worker.clone()).with_timeout(app_config.tasks.timeout());
    let submission = Arc::new(SubmissionService::new(
        store.clone(),
        executor,
        default_config,
    ));
    let status = Arc::new(StatusQueryService::new(store.clone()));

    // 啟動終態記錄清理任務（如有設定保留期限）
    if let Some(retention) = app_config.tasks.retention() {
        let sweep_store = store.clone();
        let sweep_interval = app_config.tasks.sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            loop {
                ticker.tick().await;
                let purged = sweep_store.purge_terminal_older_than(retention);
                if purged > 0 {
                    info!("已清理 {} 筆過期任務記錄", purged);
                }
            }
        });
    }

    // 啟動資料抓取排程器
    if app_config.scheduler.enabled {
        let scheduler = FetchScheduler::new(
            &app_config.scheduler,
            app_config.fetch.clone(),
            worker.clone(),
        )?;
        scheduler.start();
    }

    // 初始化REST API
    let state = AppState {
        submission,
        status,
        engine: worker.clone(),
        fetcher: worker,
        fetch_config: app_config.fetch.clone(),
        csv_store,
    };
    let rest_api = RestApi::new(app_config.server.clone(), state);

    info!("伺服器初始化完成，等待請求...");
    info!("監聽端口: {}", app_config.server.port);

    // 服務請求直到收到關閉信號
    tokio::select! {
        result = rest_api.start() => result,
        _ = signal::ctrl_c() => {
            info!("接收到關閉信號，正在退出...");
            Ok(())
        }
    }
}

// 初始化日誌系統
fn init_logging(log_config: &LogConfig) -> Result<()> {
    let level = match log_config.level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO, // 默認為INFO
    };

    let result = if log_config.format.eq_ignore_ascii_case("json") {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_max_level(level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_max_level(level)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    result.map_err(|e| anyhow!("設置日誌系統失敗: {}", e))?;

    info!("日誌系統初始化完成");
    Ok(())
}
