// Public API
pub mod cli;
pub mod commands;

// Core domain types
mod config;
mod coordinator;
mod error;
mod provisioner;
mod runner;
mod scanner;
mod sink;
mod ui;
mod util;

// Re-export main types
pub use config::Settings;
pub use coordinator::{AcquisitionCoordinator, AcquisitionGate};
pub use error::AcquireError;
pub use provisioner::{
    executable_name, tool_path_in, NpmInstaller, PackageInstaller, ToolProvisioner, TOOL_NAME,
    TOOL_VERSION,
};
pub use runner::{build_args, ProcessInvocationResult, ProcessRunner};
pub use scanner::{scan, typings_root, ScanOutcome, TYPINGS_DIR};
pub use sink::{ConsoleSink, MemorySink, OutputSink};
