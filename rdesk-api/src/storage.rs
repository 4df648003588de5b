//! Object storage for uploaded files
//!
//! Objects are addressed by a relative key such as
//! `audio/<release id>/<uuid>-Nova_-_Night_Drive.wav`. The local store
//! writes under `<root>/uploads` and the router serves that directory at
//! the public URL prefix.

use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncWrite;
use tracing::debug;

pub type ObjectWriter = Pin<Box<dyn AsyncWrite + Send>>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Open `key` for writing, replacing any existing object
    async fn create(&self, key: &str) -> io::Result<ObjectWriter>;

    /// Remove a partially written or rejected object
    async fn delete(&self, key: &str) -> io::Result<()>;

    /// Public URL for `key`
    fn url_for(&self, key: &str) -> String;
}

/// Store backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFsStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalFsStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || key.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid object key: {key}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalFsStore {
    async fn create(&self, key: &str) -> io::Result<ObjectWriter> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!("Writing object {}", path.display());
        let file = tokio::fs::File::create(&path).await?;
        Ok(Box::pin(file))
    }

    async fn delete(&self, key: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.url_prefix, key)
    }
}

/// File name reduced to a URL-safe single path segment
///
/// Spaces become underscores; anything outside `[A-Za-z0-9._-]` is dropped.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
