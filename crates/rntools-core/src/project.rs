use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::constants::{MANIFEST_NODE, MIN_REACT_NATIVE_VERSION, REACT_NATIVE_PACKAGE};
use crate::error::ProbeError;

/// Answers whether a workspace is a React Native project and whether its
/// toolchain is new enough.
#[async_trait]
pub trait ProjectProbe: Send + Sync {
    async fn is_supported_project(&self, root: &Path) -> Result<bool, ProbeError>;
    /// Fails with a human-readable reason when the installed version is unsupported.
    async fn validate_version(&self, root: &Path) -> Result<(), ProbeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSupportStatus {
    Unsupported,
    SupportedCompatible,
    SupportedIncompatibleVersion { reason: String },
}

impl ProjectSupportStatus {
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// A `major.minor.patch` release number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses the lower bound of an npm-style range such as `^0.20.1` or `>=0.19`.
    pub fn parse_lower_bound(range: &str) -> Result<Self, ProbeError> {
        let trimmed = range
            .trim()
            .trim_start_matches(['^', '~', '>', '=', 'v', ' ']);
        let first = trimmed.split_whitespace().next().unwrap_or_default();
        let core = first.split(['-', '+']).next().unwrap_or_default();

        let mut parts = core.split('.');
        let mut next = |required: bool| -> Result<u64, ProbeError> {
            match parts.next() {
                Some(p) if p == "x" || p == "*" => Ok(0),
                Some(p) => p
                    .parse::<u64>()
                    .map_err(|_| ProbeError::UnrecognizedVersion(range.to_string())),
                None if required => Err(ProbeError::UnrecognizedVersion(range.to_string())),
                None => Ok(0),
            }
        };

        let major = next(true)?;
        let minor = next(true)?;
        let patch = next(false)?;
        Ok(Self::new(major, minor, patch))
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = ProbeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_lower_bound(value)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    version: Option<String>,
    #[serde(default)]
    dependencies: std::collections::HashMap<String, String>,
    #[serde(default)]
    dev_dependencies: std::collections::HashMap<String, String>,
}

impl PackageManifest {
    fn react_native_range(&self) -> Option<&str> {
        self.dependencies
            .get(REACT_NATIVE_PACKAGE)
            .or_else(|| self.dev_dependencies.get(REACT_NATIVE_PACKAGE))
            .map(String::as_str)
    }
}

/// Probe that reads `package.json` files on disk.
#[derive(Debug, Clone)]
pub struct PackageJsonProbe {
    minimum: Version,
}

impl Default for PackageJsonProbe {
    fn default() -> Self {
        let minimum = MIN_REACT_NATIVE_VERSION
            .parse()
            .unwrap_or(Version::new(0, 19, 0));
        Self { minimum }
    }
}

impl PackageJsonProbe {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_manifest(path: &Path) -> Result<Option<PackageManifest>, ProbeError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProbeError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ProbeError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// The installed version, falling back to the declared dependency range.
    async fn detect_version(&self, root: &Path) -> Result<String, ProbeError> {
        let installed: PathBuf = root
            .join("node_modules")
            .join(REACT_NATIVE_PACKAGE)
            .join(MANIFEST_NODE);
        if let Some(version) = Self::read_manifest(&installed)
            .await?
            .and_then(|m| m.version)
        {
            debug!("installed react-native version: {}", version);
            return Ok(version);
        }

        let manifest_path = root.join(MANIFEST_NODE);
        Self::read_manifest(&manifest_path)
            .await?
            .as_ref()
            .and_then(PackageManifest::react_native_range)
            .map(ToOwned::to_owned)
            .ok_or(ProbeError::MissingDependency {
                path: manifest_path,
            })
    }
}

#[async_trait]
impl ProjectProbe for PackageJsonProbe {
    #[instrument(skip(self))]
    async fn is_supported_project(&self, root: &Path) -> Result<bool, ProbeError> {
        let manifest = Self::read_manifest(&root.join(MANIFEST_NODE)).await?;
        Ok(manifest
            .as_ref()
            .and_then(PackageManifest::react_native_range)
            .is_some())
    }

    #[instrument(skip(self))]
    async fn validate_version(&self, root: &Path) -> Result<(), ProbeError> {
        let raw = self.detect_version(root).await?;
        let found = Version::parse_lower_bound(&raw)?;
        if found < self.minimum {
            return Err(ProbeError::Unsupported {
                found: found.to_string(),
                minimum: self.minimum.to_string(),
            });
        }
        Ok(())
    }
}
