use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::constants::{DEBUGGER_DIR, NODE_DEBUG_LOCATION_FILE};
use crate::error::{ActivationError, Result};
use crate::fs::FileSystem;

/// Where the peer Node debugger extension is installed, persisted for the
/// debugger process launched later.
///
/// A missing peer is written as `{}`; readers must treat the absent key as
/// "unknown location".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDebugLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_debug_path: Option<PathBuf>,
}

impl NodeDebugLocation {
    pub fn new(node_debug_path: Option<PathBuf>) -> Self {
        Self { node_debug_path }
    }

    pub fn file_path(extension_dir: &Path) -> PathBuf {
        extension_dir
            .join(DEBUGGER_DIR)
            .join(NODE_DEBUG_LOCATION_FILE)
    }

    /// Writes the location file under `extension_dir`, returning its path.
    #[instrument(skip(self, fs))]
    pub async fn persist(&self, extension_dir: &Path, fs: &dyn FileSystem) -> Result<PathBuf> {
        if self.node_debug_path.is_none() {
            warn!("peer debugger extension not found; writing an empty location");
        }

        let path = Self::file_path(extension_dir);
        let json = serde_json::to_vec(self).map_err(|source| ActivationError::Serialize {
            path: path.clone(),
            source,
        })?;

        if let Some(dir) = path.parent() {
            fs.ensure_directory(dir)
                .await
                .map_err(|source| ActivationError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }
        fs.write_file(&path, &json)
            .await
            .map_err(|source| ActivationError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
