//! InMemory Content Store 実装
//!
//! 保存したメッセージをプロセスのメモリ上に保持します。
//! `--history-file` が指定されていない場合のデフォルトの保存先です。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ContentRecord, ContentStore, PersistenceError};

/// インメモリ Content Store 実装
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    records: Mutex<Vec<ContentRecord>>,
    /// 保存できる最大件数（None なら無制限）
    capacity: Option<usize>,
}

impl InMemoryContentStore {
    /// 容量無制限の InMemoryContentStore を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 最大 `capacity` 件まで保存できる InMemoryContentStore を作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    /// 保存済みのメッセージ（保存順）
    pub async fn records(&self) -> Vec<ContentRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn save_content(&self, record: ContentRecord) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().await;
        if let Some(capacity) = self.capacity
            && records.len() >= capacity
        {
            return Err(PersistenceError::CapacityExceeded(capacity));
        }
        records.push(record);
        Ok(())
    }
}
