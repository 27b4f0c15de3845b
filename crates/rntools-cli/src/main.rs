use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use rntools_core::constants::CONFIG_FILE;
use rntools_core::{ActivationContext, ActivationReport, Activator, CommandId, Host, RnToolsConfig};
use rntools_packager::PackagerManager;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod host;
mod styles;

const PACKAGER_POLL_INTERVAL: Duration = Duration::from_millis(250);

use host::ConsoleHost;
use styles as s;

/// The command-line host for the React Native tooling integration.
#[derive(Debug, Parser)]
#[command(name = "rnt")]
#[command(version)]
#[command(styles = s::get_clap_styles())]
#[command(
    help_template = "{bin} {version}\n\n{about-with-newline}{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
#[command(about = "Activate React Native tooling against a workspace")]
#[command(
    long_about = "rnt activates the React Native tooling integration against a workspace the
way an editor would: it detects the project, drops the debugger launcher stub,
records the peer debugger location and registers the packager commands.
It then optionally runs one of those commands and deactivates.

Commands:
  run-android       Build and run the app on an Android device or emulator
  run-ios           Build and run the app on the iOS simulator
  start-packager    Start the packager and keep it up until Ctrl-C
  stop-packager     Stop the packager
"
)]
#[command(
    after_help = "\x1b[1;32mExamples:\x1b[0m\n  \x1b[36mrnt --workspace ./MyApp\x1b[0m                   \x1b[2m# Activate only\x1b[0m\n  \x1b[36mrnt --workspace ./MyApp start-packager\x1b[0m    \x1b[2m# Serve until Ctrl-C\x1b[0m\n  \x1b[36mrnt --workspace ./MyApp run-android\x1b[0m       \x1b[2m# Deploy to Android\x1b[0m"
)]
pub(crate) struct Cli {
    /// Command to run after activation, e.g. `run-android` or `reactNative.runAndroid`
    command: Option<String>,
    /// Path to the rntools config file. Defaults to `rntools.toml` when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Workspace folder to activate against. Omit to activate without a workspace.
    #[arg(long)]
    workspace: Option<PathBuf>,
    /// Extension install directory; receives `debugger/nodeDebugLocation.json`.
    #[arg(long, default_value = ".")]
    extension_dir: PathBuf,
    /// Print the registered commands after activation.
    #[arg(long, default_value_t = false)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    debug!("parsed cli arguments: {:?}", cli);

    let cfg = load_config(cli.config.as_deref())?;
    let command = cli
        .command
        .as_deref()
        .map(CommandId::from_str)
        .transpose()
        .map_err(|e| anyhow!("{e} (expected one of: run-android, run-ios, start-packager, stop-packager)"))?;

    run(&cli, cfg, command).await
}

fn load_config(path: Option<&Path>) -> Result<RnToolsConfig> {
    match path {
        Some(path) => RnToolsConfig::load_from_file(path)
            .with_context(|| format!("unable to load config '{}'", path.display())),
        None if Path::new(CONFIG_FILE).exists() => {
            RnToolsConfig::load_from_file(Path::new(CONFIG_FILE))
        }
        None => {
            debug!("no {} found, using defaults", CONFIG_FILE);
            Ok(RnToolsConfig::default())
        }
    }
}

fn resolve_workspace(path: Option<&Path>) -> Result<Option<PathBuf>> {
    path.map(|p| {
        std::fs::canonicalize(p)
            .with_context(|| format!("workspace '{}' is not accessible", p.display()))
    })
    .transpose()
}

/// Activates, optionally executes `command`, then tears down.
async fn run(cli: &Cli, cfg: RnToolsConfig, command: Option<CommandId>) -> Result<()> {
    let workspace = resolve_workspace(cli.workspace.as_deref())?;
    let host = Arc::new(ConsoleHost::new(workspace, cfg.peers.clone()));
    let packager = Arc::new(PackagerManager::new(host.workspace_root(), cfg.packager.clone()));
    let activator = Activator::new(host.clone(), packager.clone(), cfg.extension.clone());

    let mut ctx = ActivationContext::new(&cli.extension_dir);
    let report = activator.activate(&mut ctx).await?;
    print_report(&report);

    if cli.list {
        for id in host.command_ids() {
            println!(" - {}", id);
        }
    }

    let result = match command {
        Some(id) => execute(&host, &packager, id).await,
        None => Ok(()),
    };

    ctx.dispose_all();
    if let Some(stopping) = activator.deactivate() {
        stopping.await.context("deactivation task panicked")?;
    }
    result
}

async fn execute(host: &ConsoleHost, packager: &PackagerManager, id: CommandId) -> Result<()> {
    info!("run {}", id);
    host.invoke(id.as_str())
        .await
        .with_context(|| format!("{} failed", id.short_name()))?;

    if id == CommandId::StartPackager {
        println!("packager running, press Ctrl-C to stop");
        wait_for_packager(packager).await?;
    }
    Ok(())
}

/// Returns on Ctrl-C, or with an error once the packager exits on its own.
async fn wait_for_packager(packager: &PackagerManager) -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut poll = tokio::time::interval(PACKAGER_POLL_INTERVAL);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                return signal.context("failed to listen for Ctrl-C");
            }
            _ = poll.tick() => {
                if !packager.is_running().await {
                    return Err(anyhow!("packager exited unexpectedly"));
                }
            }
        }
    }
}

fn print_report(report: &ActivationReport) {
    let workspace = report
        .workspace_root
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<none>".to_string());
    println!("activated workspace={} status={:?}", workspace, report.status);
    if let Some(stub) = &report.launcher_stub {
        println!(" - launcher stub: {}", stub.display());
    }
    if let Some(peer) = &report.peer_config {
        println!(" - debugger location: {}", peer.display());
    }
    for failure in &report.failures {
        println!(" - {:?} failed: {}", failure.step, failure.message);
    }
}
