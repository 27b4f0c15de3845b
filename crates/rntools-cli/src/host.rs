use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Result};
use tracing::{debug, error, warn};

use rntools_core::host::on_dispose;
use rntools_core::{CommandHandler, Disposable, Host, OutputChannel};

use crate::styles as s;

type CommandTable = Arc<Mutex<BTreeMap<String, CommandHandler>>>;

/// A terminal stand-in for the IDE.
pub struct ConsoleHost {
    workspace: Option<PathBuf>,
    peers: HashMap<String, PathBuf>,
    commands: CommandTable,
}

impl ConsoleHost {
    pub fn new(workspace: Option<PathBuf>, peers: HashMap<String, PathBuf>) -> Self {
        Self {
            workspace,
            peers,
            commands: Arc::default(),
        }
    }

    /// Identifiers currently bound, sorted.
    pub fn command_ids(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Runs the handler registered under `id`.
    pub async fn invoke(&self, id: &str) -> Result<()> {
        let handler = self
            .commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("command '{}' is not registered", id))?;
        debug!("invoking {}", id);
        handler().await
    }
}

impl Host for ConsoleHost {
    fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace.clone()
    }

    fn register_command(&self, id: &str, handler: CommandHandler) -> Box<dyn Disposable> {
        let previous = self
            .commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), handler);
        if previous.is_some() {
            warn!("command '{}' was already registered, replacing it", id);
        }

        let commands = Arc::clone(&self.commands);
        let id = id.to_string();
        on_dispose(move || {
            commands
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
        })
    }

    fn show_warning(&self, message: &str) {
        warn!("{}", message);
        eprintln!("{} {}", s::paint(s::WARNING, "warning:"), message);
    }

    fn show_error(&self, message: &str) {
        error!("{}", message);
        eprintln!("{} {}", s::paint(s::ERROR, "error:"), message);
    }

    fn output_channel(&self, name: &str) -> Box<dyn OutputChannel> {
        Box::new(ConsoleChannel {
            name: name.to_string(),
            pending: Vec::new(),
            visible: false,
        })
    }

    fn find_extension(&self, id: &str) -> Option<PathBuf> {
        let found = self.peers.get(id).cloned();
        if found.is_none() {
            debug!("extension '{}' is not configured under [peers]", id);
        }
        found
    }
}

/// Buffers lines until the channel is shown, then streams them to stderr.
struct ConsoleChannel {
    name: String,
    pending: Vec<String>,
    visible: bool,
}

impl ConsoleChannel {
    fn print(&self, line: &str) {
        eprintln!("{} {}", s::paint(s::CHANNEL, &format!("[{}]", self.name)), line);
    }
}

impl OutputChannel for ConsoleChannel {
    fn append_line(&mut self, line: &str) {
        debug!(channel = %self.name, "{}", line);
        if self.visible {
            self.print(line);
        } else {
            self.pending.push(line.to_string());
        }
    }

    fn show(&mut self) {
        self.visible = true;
        for line in std::mem::take(&mut self.pending) {
            self.print(&line);
        }
    }
}
