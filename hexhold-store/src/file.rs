//! JSON-files-on-disk store

use async_trait::async_trait;
use hexhold_core::persist::{StateStore, StoreError};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores each table as `<root>/<level>/<table>.json`
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, level: &str, table: &str) -> PathBuf {
        self.root.join(level).join(format!("{table}.json"))
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn load(&self, level: &str, table: &str) -> Result<Option<Value>, StoreError> {
        let path = self.table_path(level, table);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Backend(format!(
                "reading {}: {err}",
                path.display()
            ))),
        }
    }

    async fn save(&self, level: &str, table: &str, data: Value) -> Result<(), StoreError> {
        let path = self.table_path(level, table);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                StoreError::Backend(format!("creating {}: {err}", parent.display()))
            })?;
        }
        let content = serde_json::to_string_pretty(&data)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|err| StoreError::Backend(format!("writing {}: {err}", path.display())))
    }
}
