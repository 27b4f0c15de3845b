//! React Native CLI process management.
//!
//! [`PackagerManager`] runs `react-native run-android` / `run-ios` to
//! completion and keeps at most one long-lived `react-native start`
//! (the packager) alive per manager.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use rntools_core::{CommandId, PackagerConfig, ProcessLifecycle};

#[derive(Debug, Error)]
pub enum PackagerError {
    #[error("no workspace is open")]
    NoWorkspace,
    #[error("'{0}' is not run as a CLI process")]
    NotACliCommand(CommandId),
    #[error("failed to start command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("command failed with status {status}: {command}")]
    Failed { command: String, status: ExitStatus },
    #[error("failed to stop packager: {0}")]
    Kill(#[source] io::Error),
}

/// The CLI invocation backing `cmd`, if it is run as a process.
pub fn build_command(cmd: CommandId, cfg: &PackagerConfig) -> Option<Vec<String>> {
    match cmd {
        CommandId::RunAndroid => Some(argv(&[&cfg.program, "run-android"])),
        CommandId::RunIos => Some(argv(&[&cfg.program, "run-ios"])),
        CommandId::StartPackager => Some(argv(&[
            &cfg.program,
            "start",
            "--port",
            &cfg.port.to_string(),
        ])),
        CommandId::StopPackager => None,
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

/// Drops the handle of a packager that already exited. Returns whether a
/// live packager remains.
fn reap_if_exited(slot: &mut Option<Child>) -> bool {
    let Some(child) = slot.as_mut() else {
        return false;
    };
    match child.try_wait() {
        Ok(None) => true,
        Ok(Some(status)) => {
            info!("packager exited with status {}", status);
            *slot = None;
            false
        }
        Err(e) => {
            warn!("failed to poll packager: {}", e);
            *slot = None;
            false
        }
    }
}

#[derive(Debug)]
pub struct PackagerManager {
    workspace_root: Option<PathBuf>,
    config: PackagerConfig,
    packager: Mutex<Option<Child>>,
}

impl PackagerManager {
    pub fn new(workspace_root: Option<PathBuf>, config: PackagerConfig) -> Self {
        Self {
            workspace_root,
            config,
            packager: Mutex::new(None),
        }
    }

    pub async fn is_running(&self) -> bool {
        reap_if_exited(&mut *self.packager.lock().await)
    }

    /// Process id of the live packager, if any.
    pub async fn packager_pid(&self) -> Option<u32> {
        let mut slot = self.packager.lock().await;
        if !reap_if_exited(&mut slot) {
            return None;
        }
        slot.as_ref().and_then(Child::id)
    }

    fn root(&self) -> Result<&Path, PackagerError> {
        self.workspace_root
            .as_deref()
            .ok_or(PackagerError::NoWorkspace)
    }

    fn command(&self, cmd: CommandId) -> Result<(Command, String), PackagerError> {
        let root = self.root()?;
        let argv = build_command(cmd, &self.config).ok_or(PackagerError::NotACliCommand(cmd))?;
        let (program, args) = argv
            .split_first()
            .ok_or(PackagerError::NotACliCommand(cmd))?;

        let mut command = Command::new(program);
        command.args(args).current_dir(root);
        Ok((command, argv.join(" ")))
    }

    #[instrument(skip(self))]
    async fn run_to_completion(&self, cmd: CommandId) -> Result<(), PackagerError> {
        let (mut command, rendered) = self.command(cmd)?;
        info!("run {}", rendered);

        let status = command
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| PackagerError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PackagerError::Failed {
                command: rendered,
                status,
            });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn start(&self) -> Result<(), PackagerError> {
        let mut slot = self.packager.lock().await;
        if reap_if_exited(&mut slot) {
            debug!("packager already running");
            return Ok(());
        }

        let (mut command, rendered) = self.command(CommandId::StartPackager)?;
        let child = command
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PackagerError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        info!(pid = ?child.id(), "started packager: {}", rendered);
        *slot = Some(child);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&self) -> Result<(), PackagerError> {
        let mut slot = self.packager.lock().await;
        if !reap_if_exited(&mut slot) {
            debug!("no packager running");
            return Ok(());
        }
        let Some(mut child) = slot.take() else {
            return Ok(());
        };

        let pid = child.id();
        match child.kill().await {
            Ok(()) => {
                info!(pid = ?pid, "stopped packager");
                Ok(())
            }
            // Exited between the poll and the kill.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(PackagerError::Kill(e)),
        }
    }
}

#[async_trait]
impl ProcessLifecycle for PackagerManager {
    async fn run_android(&self) -> anyhow::Result<()> {
        Ok(self.run_to_completion(CommandId::RunAndroid).await?)
    }

    async fn run_ios(&self) -> anyhow::Result<()> {
        Ok(self.run_to_completion(CommandId::RunIos).await?)
    }

    async fn start_packager(&self) -> anyhow::Result<()> {
        Ok(self.start().await?)
    }

    async fn stop_packager(&self) -> anyhow::Result<()> {
        Ok(self.stop().await?)
    }
}
