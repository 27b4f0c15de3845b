//! The activation pipeline.
//!
//! [`Activator::activate`] runs once per workspace open:
//!
//! 1. initialize telemetry (failures swallowed);
//! 2. ask the probe whether the workspace is a React Native project;
//! 3. validate the installed version (advisory warning on failure);
//! 4. deposit the launcher stub;
//! 5. run the workspace integrations;
//! 6. register the commands, always;
//! 7. persist the peer debugger location.
//!
//! Steps 3 to 5 only run for supported projects. Every step is fallible on
//! its own; failures are recorded in the [`ActivationReport`] and the
//! pipeline moves on, so command registration is never skipped.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::{self, Handle};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::command::CommandId;
use crate::config::ExtensionConfig;
use crate::constants::{EVENT_VERSION_UNSUPPORTED, MIN_REACT_NATIVE_VERSION, OUTPUT_CHANNEL};
use crate::debugger::NodeDebugLocation;
use crate::error::{ActivationError, Result};
use crate::fs::{FileSystem, LocalFileSystem};
use crate::host::{ActivationContext, Host};
use crate::integration::{default_integrations, WorkspaceIntegration};
use crate::launcher::LauncherStub;
use crate::lifecycle::ProcessLifecycle;
use crate::project::{PackageJsonProbe, ProjectProbe, ProjectSupportStatus};
use crate::registry::register_commands;
use crate::telemetry::{properties, TelemetrySink, TracingTelemetry};

/// Pipeline stages, as recorded in [`StepFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Telemetry,
    Probe,
    LauncherStub,
    Integration,
    PeerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: Step,
    pub message: String,
}

/// What a single activation did.
#[derive(Debug, Clone)]
pub struct ActivationReport {
    pub workspace_root: Option<PathBuf>,
    pub status: ProjectSupportStatus,
    pub launcher_stub: Option<PathBuf>,
    pub commands: Vec<CommandId>,
    pub peer_config: Option<PathBuf>,
    /// Failures the pipeline tolerated, in the order they happened.
    pub failures: Vec<StepFailure>,
}

impl ActivationReport {
    fn new(workspace_root: Option<PathBuf>) -> Self {
        Self {
            workspace_root,
            status: ProjectSupportStatus::Unsupported,
            launcher_stub: None,
            commands: Vec::new(),
            peer_config: None,
            failures: Vec::new(),
        }
    }

    /// Continue-on-error: keeps the value, or records the failure.
    fn recover<T>(&mut self, step: Step, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(step = ?step, error = %e, "activation step failed, continuing");
                self.failures.push(StepFailure {
                    step,
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

/// Owns the collaborators of an activation and the deactivation hook.
pub struct Activator {
    host: Arc<dyn Host>,
    lifecycle: Arc<dyn ProcessLifecycle>,
    extension: ExtensionConfig,
    probe: Arc<dyn ProjectProbe>,
    telemetry: Arc<dyn TelemetrySink>,
    fs: Arc<dyn FileSystem>,
    integrations: Vec<Box<dyn WorkspaceIntegration>>,
    activated: AtomicBool,
}

impl Activator {
    /// An activator using the on-disk probe, tracing telemetry and the local
    /// filesystem.
    pub fn new(
        host: Arc<dyn Host>,
        lifecycle: Arc<dyn ProcessLifecycle>,
        extension: ExtensionConfig,
    ) -> Self {
        Self {
            host,
            lifecycle,
            extension,
            probe: Arc::new(PackageJsonProbe::new()),
            telemetry: Arc::new(TracingTelemetry::new()),
            fs: Arc::new(LocalFileSystem),
            integrations: default_integrations(),
            activated: AtomicBool::new(false),
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn ProjectProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_integrations(mut self, integrations: Vec<Box<dyn WorkspaceIntegration>>) -> Self {
        self.integrations = integrations;
        self
    }

    /// Runs the pipeline. Only a repeated call fails; step failures are
    /// reported in the returned [`ActivationReport`].
    #[instrument(skip_all, fields(extension = %self.extension.name))]
    pub async fn activate(&self, ctx: &mut ActivationContext) -> Result<ActivationReport> {
        if self.activated.swap(true, Ordering::SeqCst) {
            return Err(ActivationError::AlreadyActivated);
        }

        let root = self.host.workspace_root();
        let mut report = ActivationReport::new(root.clone());

        let telemetry = self
            .telemetry
            .init(&self.extension.name, &self.extension.version)
            .await
            .map_err(|e| ActivationError::Telemetry(format!("{e:#}")));
        report.recover(Step::Telemetry, telemetry);

        match &root {
            Some(root) => {
                let status = self.detect(root, &mut report).await;
                report.status = status;
                if report.status.is_supported() {
                    self.setup_workspace(root, ctx, &mut report).await;
                }
            }
            None => debug!("no workspace open, skipping project setup"),
        }

        report.commands = register_commands(self.host.as_ref(), ctx, &self.lifecycle);

        if root.is_some() {
            let result = self.persist_peer_location(ctx.extension_path()).await;
            let peer_config = report.recover(Step::PeerConfig, self.surface(result));
            report.peer_config = peer_config;
        }

        info!(
            status = ?report.status,
            commands = report.commands.len(),
            failures = report.failures.len(),
            "activation complete"
        );
        Ok(report)
    }

    /// Stops the packager.
    ///
    /// Inside a tokio runtime the stop is spawned and the handle returned;
    /// await it to wait for the process to exit. Outside one, the stop runs
    /// to completion on a temporary current-thread runtime and `None` is
    /// returned.
    pub fn deactivate(&self) -> Option<JoinHandle<()>> {
        info!("deactivating, stopping packager");
        let lifecycle = Arc::clone(&self.lifecycle);
        let stop = async move {
            if let Err(e) = lifecycle.stop_packager().await {
                warn!("failed to stop packager: {e:#}");
            }
        };

        match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(stop)),
            Err(_) => {
                debug!("no runtime available, stopping packager on a temporary one");
                match runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(rt) => rt.block_on(stop),
                    Err(e) => warn!("failed to start runtime for packager shutdown: {e}"),
                }
                None
            }
        }
    }

    async fn detect(&self, root: &Path, report: &mut ActivationReport) -> ProjectSupportStatus {
        let supported = self
            .probe
            .is_supported_project(root)
            .await
            .map_err(ActivationError::from);
        if !report.recover(Step::Probe, supported).unwrap_or(false) {
            debug!("{} is not a React Native project", root.display());
            return ProjectSupportStatus::Unsupported;
        }

        match self.probe.validate_version(root).await {
            Ok(()) => ProjectSupportStatus::SupportedCompatible,
            Err(e) => {
                let reason = e.to_string();
                self.report_unsupported_version(&reason);
                ProjectSupportStatus::SupportedIncompatibleVersion { reason }
            }
        }
    }

    fn report_unsupported_version(&self, reason: &str) {
        self.telemetry
            .send_event(EVENT_VERSION_UNSUPPORTED, properties([("rnVersion", reason)]));

        let short = format!(
            "React Native Tools only supports React Native versions {MIN_REACT_NATIVE_VERSION} and later"
        );
        self.host.show_warning(&short);

        let mut output = self.host.output_channel(OUTPUT_CHANNEL);
        output.append_line(&format!("{short}: {reason}"));
        output.show();
    }

    async fn setup_workspace(
        &self,
        root: &Path,
        ctx: &mut ActivationContext,
        report: &mut ActivationReport,
    ) {
        let launcher = self.extension.launcher_path(ctx.extension_path());
        let deposited = self.deposit_launcher(root, &launcher).await;
        let stub = report.recover(Step::LauncherStub, self.surface(deposited));
        report.launcher_stub = stub;

        for integration in &self.integrations {
            debug!("setting up {}", integration.name());
            let result = integration.setup(root, self.fs.as_ref()).await;
            if let Some(Some(handle)) = report.recover(Step::Integration, result) {
                ctx.push(handle);
            }
        }
    }

    async fn deposit_launcher(&self, root: &Path, launcher: &Path) -> Result<PathBuf> {
        let stub = LauncherStub::render(root, launcher, &self.extension)?;
        stub.deposit(self.fs.as_ref()).await?;
        Ok(stub.path().to_path_buf())
    }

    async fn persist_peer_location(&self, extension_dir: &Path) -> Result<PathBuf> {
        let peer = self.host.find_extension(&self.extension.peer_debugger);
        NodeDebugLocation::new(peer)
            .persist(extension_dir, self.fs.as_ref())
            .await
    }

    /// Shows a failed step's error to the user.
    fn surface<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.host.show_error(&e.to_string());
        }
        result
    }
}
