use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 回測結果報告
///
/// metrics、trades 與 equity_curve 由外部協作者原樣產生，
/// 閘道僅負責傳遞與保存。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub metrics: Value,
    pub trades: Vec<Value>,
    pub equity_curve: Value,
}
