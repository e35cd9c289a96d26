//! Filesystem-backed object store
//!
//! Objects live at `{root}/{bucket}/{key}`. The `{root}` directory is what the
//! HTTP layer serves under the public base URL.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{validate_key, ObjectStore, PublicUrls};
use crate::Result;

pub struct FsObjectStore {
    root: PathBuf,
    urls: PublicUrls,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, urls: PublicUrls) -> Self {
        Self {
            root: root.into(),
            urls,
        }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(self.urls.bucket()).join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!("Stored object {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed object {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Object {} already absent", key);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn url_for(&self, key: &str) -> String {
        self.urls.url_for(key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        self.urls.key_from_url(url)
    }
}
