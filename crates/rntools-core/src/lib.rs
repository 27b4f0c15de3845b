//! Core activation logic for the React Native tooling integration.
//!
//! This crate defines the host abstraction, the activation pipeline, the
//! launcher stub generator, the command registry adapter and the
//! configuration shared across the rntools workspace.

pub mod activation;
pub mod command;
pub mod config;
pub mod constants;
pub mod debugger;
pub mod error;
pub mod fs;
pub mod host;
pub mod integration;
pub mod launcher;
pub mod lifecycle;
pub mod project;
pub mod registry;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use activation::{ActivationReport, Activator, Step, StepFailure};
pub use command::CommandId;
pub use config::{ExtensionConfig, PackagerConfig, RnToolsConfig};
pub use error::{ActivationError, ProbeError};
pub use host::{ActivationContext, CommandHandler, Disposable, Host, OutputChannel};
pub use lifecycle::ProcessLifecycle;
pub use project::{PackageJsonProbe, ProjectProbe, ProjectSupportStatus};
