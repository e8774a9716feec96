//! CSV 檔案儲存模組
//!
//! 管理 csv 目錄：保存上傳的資料檔案、讀取股票清單。

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::info;

/// 儲存層錯誤類型
#[derive(Error, Debug)]
pub enum StorageError {
    /// 無效的檔案名稱
    #[error("無效的檔案名稱: {0}")]
    InvalidFilename(String),

    /// 股票清單檔案不存在
    #[error("找不到股票清單檔案: {0}")]
    UniverseNotFound(PathBuf),

    /// IO 錯誤
    #[error("IO 錯誤: {0}")]
    Io(#[from] std::io::Error),

    /// CSV 解析錯誤
    #[error("CSV 解析錯誤: {0}")]
    Csv(#[from] csv::Error),
}

/// 儲存結果類型別名
pub type StorageResult<T> = Result<T, StorageError>;

/// 股票清單檔案名稱
const UNIVERSE_FILE: &str = "nifty500.csv";

/// CSV 檔案儲存庫
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 確保 csv 目錄存在
    pub async fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// 保存上傳的檔案
    ///
    /// 檔案名稱不得為空、不得包含路徑分隔符號或指向上層目錄。
    pub async fn save_upload(&self, filename: &str, content: &[u8]) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\'])
        {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }

        let path = self.dir.join(filename);
        fs::write(&path, content).await?;
        info!("已保存上傳檔案: {}", path.display());
        Ok(path)
    }

    /// 讀取可用股票清單
    ///
    /// 優先讀取 Symbol 欄位，其次 Company Name，否則退回第一欄。
    pub fn list_stocks(&self) -> StorageResult<Vec<String>> {
        let path = self.dir.join(UNIVERSE_FILE);
        if !path.exists() {
            return Err(StorageError::UniverseNotFound(path));
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        let column = headers
            .iter()
            .position(|header| header == "Symbol")
            .or_else(|| headers.iter().position(|header| header == "Company Name"))
            .unwrap_or(0);

        let mut stocks = Vec::new();
        for row in reader.records() {
            let row = row?;
            if let Some(value) = row.get(column) {
                stocks.push(value.to_string());
            }
        }
        Ok(stocks)
    }

    /// csv 目錄路徑
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn store_in_tempdir() -> (TempDir, CsvStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_upload_writes_into_csv_dir() {
        let (dir, store) = store_in_tempdir();
        let path = store
            .save_upload("closing_data.csv", b"date,close\n2025-07-01,100\n")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("closing_data.csv"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_upload_rejects_path_traversal() {
        let (_dir, store) = store_in_tempdir();
        for bad in ["", "..", "../evil.csv", "a/b.csv", "a\\b.csv"] {
            assert_matches!(
                store.save_upload(bad, b"x").await,
                Err(StorageError::InvalidFilename(_))
            );
        }
    }

    #[tokio::test]
    async fn test_list_stocks_prefers_symbol_column() {
        let (dir, store) = store_in_tempdir();
        std::fs::write(
            dir.path().join("nifty500.csv"),
            "Company Name,Symbol\nInfosys,INFY\nTata Consultancy,TCS\n",
        )
        .unwrap();

        assert_eq!(store.list_stocks().unwrap(), vec!["INFY", "TCS"]);
    }

    #[tokio::test]
    async fn test_list_stocks_falls_back_to_company_name() {
        let (dir, store) = store_in_tempdir();
        std::fs::write(
            dir.path().join("nifty500.csv"),
            "Industry,Company Name\nIT,Infosys\nIT,Tata Consultancy\n",
        )
        .unwrap();

        assert_eq!(
            store.list_stocks().unwrap(),
            vec!["Infosys", "Tata Consultancy"]
        );
    }

    #[tokio::test]
    async fn test_list_stocks_falls_back_to_first_column() {
        let (dir, store) = store_in_tempdir();
        std::fs::write(dir.path().join("nifty500.csv"), "Ticker\nINFY\nTCS\n").unwrap();

        assert_eq!(store.list_stocks().unwrap(), vec!["INFY", "TCS"]);
    }

    #[tokio::test]
    async fn test_list_stocks_missing_universe_file() {
        let (_dir, store) = store_in_tempdir();
        assert_matches!(store.list_stocks(), Err(StorageError::UniverseNotFound(_)));
    }
}
