//! The editor-facing surface the activation consumes.
//!
//! A [`Host`] stands in for the IDE: it knows the open workspace, accepts
//! command registrations, shows notifications and owns output channels.
//! Everything an activation registers is handed back to the
//! [`ActivationContext`] as a [`Disposable`] so the host can release it on
//! shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

/// Callback bound to a command identifier.
pub type CommandHandler = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// A reversible side effect owned by the activation context.
pub trait Disposable: Send {
    fn dispose(self: Box<Self>);
}

struct DisposeFn<F: FnOnce() + Send>(F);

impl<F: FnOnce() + Send> Disposable for DisposeFn<F> {
    fn dispose(self: Box<Self>) {
        let DisposeFn(f) = *self;
        f()
    }
}

/// Wraps a closure so it runs when the owning context is disposed.
pub fn on_dispose<F>(f: F) -> Box<dyn Disposable>
where
    F: FnOnce() + Send + 'static,
{
    Box::new(DisposeFn(f))
}

/// A named, append-only text sink the user can bring into view.
pub trait OutputChannel: Send {
    fn append_line(&mut self, line: &str);
    fn show(&mut self);
}

/// The IDE services an activation depends on.
pub trait Host: Send + Sync {
    /// The open workspace folder, if any.
    fn workspace_root(&self) -> Option<PathBuf>;
    /// Binds `id` to `handler` until the returned handle is disposed.
    fn register_command(&self, id: &str, handler: CommandHandler) -> Box<dyn Disposable>;
    fn show_warning(&self, message: &str);
    fn show_error(&self, message: &str);
    fn output_channel(&self, name: &str) -> Box<dyn OutputChannel>;
    /// Install directory of another extension, looked up by identifier.
    fn find_extension(&self, id: &str) -> Option<PathBuf>;
}

/// Per-activation state supplied by the host.
pub struct ActivationContext {
    extension_path: PathBuf,
    subscriptions: Vec<Box<dyn Disposable>>,
}

impl ActivationContext {
    pub fn new(extension_path: impl Into<PathBuf>) -> Self {
        Self {
            extension_path: extension_path.into(),
            subscriptions: Vec::new(),
        }
    }

    /// Install directory of this extension.
    pub fn extension_path(&self) -> &Path {
        &self.extension_path
    }

    pub fn push(&mut self, disposable: Box<dyn Disposable>) {
        self.subscriptions.push(disposable);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Releases every subscription, most recent first.
    pub fn dispose_all(&mut self) {
        debug!("disposing {} subscriptions", self.subscriptions.len());
        while let Some(disposable) = self.subscriptions.pop() {
            disposable.dispose();
        }
    }
}

impl Drop for ActivationContext {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl std::fmt::Debug for ActivationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationContext")
            .field("extension_path", &self.extension_path)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn dispose_all_runs_in_reverse_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = ActivationContext::new("/ext");

        for n in 0..3 {
            let order = Arc::clone(&order);
            ctx.push(on_dispose(move || order.lock().unwrap().push(n)));
        }
        assert_eq!(ctx.len(), 3);

        ctx.dispose_all();
        assert!(ctx.is_empty());
        assert_eq!(*order.lock().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn dropping_context_disposes_leftovers() {
        let disposed = Arc::new(Mutex::new(false));
        {
            let mut ctx = ActivationContext::new("/ext");
            let disposed = Arc::clone(&disposed);
            ctx.push(on_dispose(move || *disposed.lock().unwrap() = true));
        }
        assert!(*disposed.lock().unwrap());
    }
}
