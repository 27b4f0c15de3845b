use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("activation already ran for this host session")]
    AlreadyActivated,
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("failed to create directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize '{}': {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Probe(#[from] ProbeError),
}

/// Failures raised while inspecting a workspace.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("React Native dependency not found in {}", .path.display())]
    MissingDependency { path: PathBuf },
    #[error("unrecognized React Native version '{0}'")]
    UnrecognizedVersion(String),
    #[error("React Native version {found} is older than {minimum}")]
    Unsupported { found: String, minimum: String },
}

pub type Result<T, E = ActivationError> = std::result::Result<T, E>;
