use anyhow::Result;
use async_trait::async_trait;

/// Runs the React Native CLI on behalf of the registered commands.
///
/// Implementations own the packager process. At most one packager may be
/// alive at a time, and concurrent `start_packager` calls must not spawn a
/// second one.
#[async_trait]
pub trait ProcessLifecycle: Send + Sync {
    async fn run_android(&self) -> Result<()>;
    async fn run_ios(&self) -> Result<()>;
    async fn start_packager(&self) -> Result<()>;
    /// Stops the packager. A no-op when nothing is running.
    async fn stop_packager(&self) -> Result<()>;
}
