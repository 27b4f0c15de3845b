//! Generation of the launcher stub dropped into the workspace.
//!
//! The stub is a tiny script that a separately launched debugger session
//! executes. It requires the launcher module shipped with the extension and
//! hands it the workspace root. The file is rebuilt on every activation so a
//! stale copy from an older install never survives.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::config::ExtensionConfig;
use crate::constants::{EDITOR_DIR, LAUNCHER_STUB_FILE};
use crate::error::{ActivationError, Result};
use crate::fs::FileSystem;

const TEMPLATE: &str = include_str!("../resources/launcher-stub.js");

/// A rendered launcher script and where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherStub {
    path: PathBuf,
    content: String,
}

impl LauncherStub {
    /// Location of the stub inside `workspace_root`.
    pub fn target_path(workspace_root: &Path) -> PathBuf {
        workspace_root.join(EDITOR_DIR).join(LAUNCHER_STUB_FILE)
    }

    /// Renders the stub for `workspace_root`, embedding `launcher_module` as
    /// a quoted string literal.
    pub fn render(
        workspace_root: &Path,
        launcher_module: &Path,
        extension: &ExtensionConfig,
    ) -> Result<Self> {
        let path = Self::target_path(workspace_root);
        let quoted = serde_json::to_string(&launcher_module.to_string_lossy()).map_err(
            |source| ActivationError::Serialize {
                path: path.clone(),
                source,
            },
        )?;

        let content = TEMPLATE
            .replace("{{EXTENSION_NAME}}", &extension.name)
            .replace("{{EXTENSION_VERSION}}", &extension.version)
            .replace("{{LAUNCHER_PATH}}", &quoted)
            .replace("{{HOST_NAME}}", &extension.host_name);

        Ok(Self { path, content })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Writes the stub, creating its directory first and replacing any
    /// existing file.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn deposit(&self, fs: &dyn FileSystem) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs.ensure_directory(dir)
                .await
                .map_err(|source| ActivationError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        fs.write_file(&self.path, self.content.as_bytes())
            .await
            .map_err(|source| ActivationError::Write {
                path: self.path.clone(),
                source,
            })?;

        debug!("launcher stub deposited");
        Ok(())
    }
}
