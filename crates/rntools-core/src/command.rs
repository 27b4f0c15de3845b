use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// The fixed set of commands exposed to the host's command palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    RunAndroid,
    RunIos,
    StartPackager,
    StopPackager,
}

impl CommandId {
    /// Every command, in registration order.
    pub const ALL: [CommandId; 4] = [
        Self::RunAndroid,
        Self::RunIos,
        Self::StartPackager,
        Self::StopPackager,
    ];

    /// The identifier the host registers the command under.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunAndroid => "reactNative.runAndroid",
            Self::RunIos => "reactNative.runIos",
            Self::StartPackager => "reactNative.startPackager",
            Self::StopPackager => "reactNative.stopPackager",
        }
    }

    /// Kebab-case alias accepted on the command line.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::RunAndroid => "run-android",
            Self::RunIos => "run-ios",
            Self::StartPackager => "start-packager",
            Self::StopPackager => "stop-packager",
        }
    }
}

impl Display for CommandId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("unknown command '{0}'")]
    Unknown(String),
}

impl FromStr for CommandId {
    type Err = CommandParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == value || id.short_name() == value)
            .ok_or_else(|| CommandParseError::Unknown(value.to_string()))
    }
}
