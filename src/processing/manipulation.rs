use serde::Deserialize;
use serde_json::{Map, Value};

/// 資料操作配置
#[derive(Debug, Clone, Deserialize)]
pub struct ManipulationConfig {
    pub filter_column: String,
    pub filter_value: Value,
}

/// 依配置過濾資料列
///
/// 保留指定欄位等於指定值的列。欄位在整份資料中都不存在時，
/// 資料原樣返回。
pub fn manipulate_rows(
    rows: Vec<Map<String, Value>>,
    config: &ManipulationConfig,
) -> Vec<Map<String, Value>> {
    let column_exists = rows.iter().any(|row| row.contains_key(&config.filter_column));
    if !column_exists {
        return rows;
    }

    rows.into_iter()
        .filter(|row| row.get(&config.filter_column) == Some(&config.filter_value))
        .collect()
}
