use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

/// Filesystem primitives the activation writes through.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Creates `path` and any missing parents. Succeeds if it already exists.
    async fn ensure_directory(&self, path: &Path) -> io::Result<()>;
    /// Replaces the contents of `path`, never leaving a partial file behind.
    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
    async fn exists(&self, path: &Path) -> bool;
}

/// Local disk, via `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn ensure_directory(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let staging = staging_path(path);
        if let Err(e) = tokio::fs::write(&staging, contents).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        debug!("wrote {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_file_replaces_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        let fs = LocalFileSystem;

        fs.write_file(&target, b"first version, longer").await.unwrap();
        fs.write_file(&target, b"second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn ensure_directory_tolerates_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let fs = LocalFileSystem;

        fs.ensure_directory(&nested).await.unwrap();
        fs.ensure_directory(&nested).await.unwrap();
        assert!(fs.exists(&nested).await);
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.txt");
        let err = LocalFileSystem
            .write_file(&target, b"data")
            .await
            .expect_err("parent does not exist");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!target.exists());
    }
}
