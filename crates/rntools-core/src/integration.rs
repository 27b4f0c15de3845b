use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::constants::{EDITOR_DIR, JSCONFIG_FILE, SCRATCH_DIR};
use crate::error::{ActivationError, Result};
use crate::fs::FileSystem;
use crate::host::{on_dispose, Disposable};

/// A workspace-scoped setup performed for supported projects.
#[async_trait]
pub trait WorkspaceIntegration: Send + Sync {
    fn name(&self) -> &str;
    /// Performs the setup. A returned handle is released on deactivation.
    async fn setup(&self, root: &Path, fs: &dyn FileSystem)
        -> Result<Option<Box<dyn Disposable>>>;
}

/// The integrations every supported workspace receives.
pub fn default_integrations() -> Vec<Box<dyn WorkspaceIntegration>> {
    vec![
        Box::new(IntellisenseIntegration) as Box<dyn WorkspaceIntegration>,
        Box::new(ScratchDirIntegration),
    ]
}

const JSCONFIG: &str = r#"{
    "compilerOptions": {
        "allowJs": true,
        "allowSyntheticDefaultImports": true
    },
    "exclude": ["node_modules"]
}
"#;

/// Seeds a `jsconfig.json` so the editor's language service understands
/// React Native sources. An existing file is left untouched.
#[derive(Debug, Default)]
pub struct IntellisenseIntegration;

#[async_trait]
impl WorkspaceIntegration for IntellisenseIntegration {
    fn name(&self) -> &str {
        "intellisense"
    }

    async fn setup(
        &self,
        root: &Path,
        fs: &dyn FileSystem,
    ) -> Result<Option<Box<dyn Disposable>>> {
        let path = root.join(JSCONFIG_FILE);
        if fs.exists(&path).await {
            debug!("keeping existing {}", path.display());
            return Ok(None);
        }
        fs.write_file(&path, JSCONFIG.as_bytes())
            .await
            .map_err(|source| ActivationError::Write { path, source })?;
        Ok(None)
    }
}

/// Owns `.vscode/.react` for the lifetime of the activation.
///
/// The directory is removed from local disk, synchronously, when the handle
/// is disposed.
#[derive(Debug, Default)]
pub struct ScratchDirIntegration;

impl ScratchDirIntegration {
    pub fn path(root: &Path) -> PathBuf {
        root.join(EDITOR_DIR).join(SCRATCH_DIR)
    }
}

#[async_trait]
impl WorkspaceIntegration for ScratchDirIntegration {
    fn name(&self) -> &str {
        "scratch-dir"
    }

    async fn setup(
        &self,
        root: &Path,
        fs: &dyn FileSystem,
    ) -> Result<Option<Box<dyn Disposable>>> {
        let dir = Self::path(root);
        fs.ensure_directory(&dir)
            .await
            .map_err(|source| ActivationError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        Ok(Some(on_dispose(move || {
            match std::fs::remove_dir_all(&dir) {
                Ok(()) => debug!("removed {}", dir.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("failed to remove {}: {}", dir.display(), e),
            }
        })))
    }
}
