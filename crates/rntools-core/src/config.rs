use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RnToolsConfig {
    #[serde(default)]
    pub extension: ExtensionConfig,
    #[serde(default)]
    pub packager: PackagerConfig,
    /// Install locations of peer extensions, keyed by extension identifier.
    #[serde(default)]
    pub peers: HashMap<String, PathBuf>,
}

impl RnToolsConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let cfg = toml::from_str::<Self>(&text)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))?;
        Ok(cfg)
    }
}

/// Identity and layout of the installed extension.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    pub name: String,
    pub version: String,
    /// Launcher module, relative to the extension install directory.
    pub launcher_module: PathBuf,
    /// Identifier of the peer debugging extension.
    pub peer_debugger: String,
    /// Host name quoted in the launcher stub's remediation message.
    pub host_name: String,
}

impl ExtensionConfig {
    pub fn launcher_path(&self, extension_dir: &Path) -> PathBuf {
        extension_dir.join(&self.launcher_module)
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            name: "react-native-tools".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            launcher_module: PathBuf::from("debugger/launcher.js"),
            peer_debugger: "andreweinand.node-debug".to_string(),
            host_name: "vscode".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PackagerConfig {
    /// The React Native CLI executable.
    pub program: String,
    pub port: u16,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            program: "react-native".to_string(),
            port: 8081,
        }
    }
}
