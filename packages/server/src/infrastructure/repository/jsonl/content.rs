//! JSON-lines Content Store 実装
//!
//! メッセージを 1 行 1 JSON でファイルに追記します。
//!
//! ```text
//! {"user_id":1,"room_id":"2","content":"hi","created_at":"2024-01-01T00:00:00+00:00"}
//! ```

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use roomcast_shared::time::{Clock, timestamp_to_rfc3339};
use serde::Serialize;
use tokio::{
    fs::{File, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};

use crate::domain::{ContentRecord, ContentStore, PersistenceError};

/// ファイルに書き込む 1 行分のレコード
#[derive(Debug, Serialize)]
struct ContentLine<'a> {
    user_id: u64,
    room_id: String,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    created_at: String,
}

/// JSON-lines Content Store 実装
pub struct JsonLinesContentStore {
    path: PathBuf,
    file: Mutex<File>,
    clock: Arc<dyn Clock>,
}

impl JsonLinesContentStore {
    /// `path` を追記モードで開く（存在しなければ作成）
    pub async fn open(
        path: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        tracing::info!("Chat history is appended to {}", path.display());

        Ok(Self {
            path,
            file: Mutex::new(file),
            clock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ContentStore for JsonLinesContentStore {
    async fn save_content(&self, record: ContentRecord) -> Result<(), PersistenceError> {
        let now = self.clock.now_millis();
        let line = ContentLine {
            user_id: record.user_id.value(),
            room_id: record.room_id.to_string(),
            content: &record.content,
            image_url: record.image_url.as_deref(),
            created_at: timestamp_to_rfc3339(now).unwrap_or_else(|| now.to_string()),
        };
        let mut bytes =
            serde_json::to_vec(&line).map_err(|e| PersistenceError::Encode(e.to_string()))?;
        bytes.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }
}
