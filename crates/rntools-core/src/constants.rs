//! Constants used across the rntools workspace.

/// The filename for rntools' primary configuration.
pub const CONFIG_FILE: &str = "rntools.toml";

/// The manifest file that marks a Node-based project.
pub const MANIFEST_NODE: &str = "package.json";

/// Package name that identifies a React Native project.
pub const REACT_NATIVE_PACKAGE: &str = "react-native";

/// Oldest React Native release the debugger integration supports.
pub const MIN_REACT_NATIVE_VERSION: &str = "0.19.0";

/// Workspace-relative directory holding editor integration files.
pub const EDITOR_DIR: &str = ".vscode";
/// Generated launcher stub, inside [`EDITOR_DIR`].
pub const LAUNCHER_STUB_FILE: &str = "launchReactNative.js";
/// Scratch directory owned by an activation, inside [`EDITOR_DIR`].
pub const SCRATCH_DIR: &str = ".react";
pub const JSCONFIG_FILE: &str = "jsconfig.json";

/// Extension-relative directory of the debugger support files.
pub const DEBUGGER_DIR: &str = "debugger";
/// Peer debugger location file, inside [`DEBUGGER_DIR`].
pub const NODE_DEBUG_LOCATION_FILE: &str = "nodeDebugLocation.json";

/// Output channel that receives long-form diagnostics.
pub const OUTPUT_CHANNEL: &str = "React-Native";

/// Telemetry event raised when the installed version is unsupported.
pub const EVENT_VERSION_UNSUPPORTED: &str = "launchDebuggerError";
