//! Recording doubles for the activation's collaborators.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::error::ProbeError;
use crate::fs::{FileSystem, LocalFileSystem};
use crate::host::{on_dispose, CommandHandler, Disposable, Host, OutputChannel};
use crate::lifecycle::ProcessLifecycle;
use crate::project::ProjectProbe;
use crate::telemetry::{Properties, TelemetrySink};

#[derive(Default)]
pub struct RecordingHost {
    pub root: Option<PathBuf>,
    pub peers: HashMap<String, PathBuf>,
    pub commands: Arc<Mutex<BTreeMap<String, CommandHandler>>>,
    pub warnings: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub output: Arc<Mutex<Vec<(String, String)>>>,
    pub shown: Arc<Mutex<Vec<String>>>,
}

impl RecordingHost {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn with_peer(mut self, id: &str, path: impl Into<PathBuf>) -> Self {
        self.peers.insert(id.to_string(), path.into());
        self
    }

    pub fn command_ids(&self) -> Vec<String> {
        self.commands.lock().unwrap().keys().cloned().collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub async fn invoke(&self, id: &str) -> Result<()> {
        let handler = self
            .commands
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("command '{id}' not registered"))?;
        handler().await
    }
}

struct RecordingChannel {
    name: String,
    output: Arc<Mutex<Vec<(String, String)>>>,
    shown: Arc<Mutex<Vec<String>>>,
}

impl OutputChannel for RecordingChannel {
    fn append_line(&mut self, line: &str) {
        self.output
            .lock()
            .unwrap()
            .push((self.name.clone(), line.to_string()));
    }

    fn show(&mut self) {
        self.shown.lock().unwrap().push(self.name.clone());
    }
}

impl Host for RecordingHost {
    fn workspace_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn register_command(&self, id: &str, handler: CommandHandler) -> Box<dyn Disposable> {
        self.commands
            .lock()
            .unwrap()
            .insert(id.to_string(), handler);
        let commands = Arc::clone(&self.commands);
        let id = id.to_string();
        on_dispose(move || {
            commands.lock().unwrap().remove(&id);
        })
    }

    fn show_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn output_channel(&self, name: &str) -> Box<dyn OutputChannel> {
        Box::new(RecordingChannel {
            name: name.to_string(),
            output: Arc::clone(&self.output),
            shown: Arc::clone(&self.shown),
        })
    }

    fn find_extension(&self, id: &str) -> Option<PathBuf> {
        self.peers.get(id).cloned()
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    pub fail_init: bool,
    pub events: Mutex<Vec<(String, Properties)>>,
}

impl RecordingTelemetry {
    pub fn failing() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<(String, Properties)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelemetrySink for RecordingTelemetry {
    async fn init(&self, _app_name: &str, _app_version: &str) -> Result<()> {
        if self.fail_init {
            return Err(anyhow!("telemetry endpoint unreachable"));
        }
        Ok(())
    }

    fn send_event(&self, name: &str, properties: Properties) {
        self.events
            .lock()
            .unwrap()
            .push((name.to_string(), properties));
    }
}

/// Probe with canned answers.
pub struct StaticProbe {
    pub supported: bool,
    pub installed: Option<&'static str>,
    /// Fail detection as if `package.json` were malformed.
    pub corrupt: bool,
}

impl StaticProbe {
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            installed: None,
            corrupt: false,
        }
    }

    pub fn compatible() -> Self {
        Self {
            supported: true,
            installed: None,
            corrupt: false,
        }
    }

    pub fn outdated(installed: &'static str) -> Self {
        Self {
            supported: true,
            installed: Some(installed),
            corrupt: false,
        }
    }

    pub fn corrupt() -> Self {
        Self {
            supported: true,
            installed: None,
            corrupt: true,
        }
    }
}

#[async_trait]
impl ProjectProbe for StaticProbe {
    async fn is_supported_project(&self, root: &Path) -> Result<bool, ProbeError> {
        if self.corrupt {
            let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
            return Err(ProbeError::Parse {
                path: root.join("package.json"),
                source,
            });
        }
        Ok(self.supported)
    }

    async fn validate_version(&self, _root: &Path) -> Result<(), ProbeError> {
        match self.installed {
            Some(found) => Err(ProbeError::Unsupported {
                found: found.to_string(),
                minimum: "0.19.0".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct CountingLifecycle {
    pub run_android: AtomicUsize,
    pub run_ios: AtomicUsize,
    pub start: AtomicUsize,
    pub stop: AtomicUsize,
}

impl CountingLifecycle {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessLifecycle for CountingLifecycle {
    async fn run_android(&self) -> Result<()> {
        self.run_android.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("no device attached"))
    }

    async fn run_ios(&self) -> Result<()> {
        self.run_ios.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn start_packager(&self) -> Result<()> {
        self.start.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_packager(&self) -> Result<()> {
        self.stop.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Local filesystem that refuses to create or write the listed paths.
#[derive(Default)]
pub struct DenyingFileSystem {
    pub deny: Vec<PathBuf>,
}

impl DenyingFileSystem {
    pub fn denying(path: impl Into<PathBuf>) -> Self {
        Self {
            deny: vec![path.into()],
        }
    }

    fn check(&self, path: &Path) -> io::Result<()> {
        if self.deny.iter().any(|d| d == path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FileSystem for DenyingFileSystem {
    async fn ensure_directory(&self, path: &Path) -> io::Result<()> {
        self.check(path)?;
        LocalFileSystem.ensure_directory(path).await
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.check(path)?;
        LocalFileSystem.write_file(path, contents).await
    }

    async fn exists(&self, path: &Path) -> bool {
        LocalFileSystem.exists(path).await
    }
}
