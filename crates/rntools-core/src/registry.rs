use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;

use crate::command::CommandId;
use crate::host::{ActivationContext, CommandHandler, Host};
use crate::lifecycle::ProcessLifecycle;

/// Builds the handler that forwards `id` to the matching lifecycle operation.
pub fn handler_for(id: CommandId, lifecycle: &Arc<dyn ProcessLifecycle>) -> CommandHandler {
    let lifecycle = Arc::clone(lifecycle);
    Arc::new(move || {
        let lifecycle = Arc::clone(&lifecycle);
        async move {
            match id {
                CommandId::RunAndroid => lifecycle.run_android().await,
                CommandId::RunIos => lifecycle.run_ios().await,
                CommandId::StartPackager => lifecycle.start_packager().await,
                CommandId::StopPackager => lifecycle.stop_packager().await,
            }
        }
        .boxed()
    })
}

/// Registers every [`CommandId`] with the host and hands the registrations
/// to the context's disposal list.
pub fn register_commands(
    host: &dyn Host,
    ctx: &mut ActivationContext,
    lifecycle: &Arc<dyn ProcessLifecycle>,
) -> Vec<CommandId> {
    CommandId::ALL
        .into_iter()
        .map(|id| {
            debug!("registering command {}", id);
            ctx.push(host.register_command(id.as_str(), handler_for(id, lifecycle)));
            id
        })
        .collect()
}
